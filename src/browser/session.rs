//! Browser session capability
//!
//! The workflow only sees these two traits. The Chrome implementation lives
//! in `infrastructure::page_driver`; tests plug in a scripted session.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SessionError;
use crate::models::CaptureKind;

/// One exclusively owned browser page
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Handle to an element found on the current page
    type Element: Send + Sync;

    /// Loads `url` and waits for the navigation to finish
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Full HTML of the current page
    async fn page_source(&self) -> Result<String, SessionError>;

    /// Waits until an element matching the CSS `selector` exists
    ///
    /// A zero `timeout` performs a single lookup. Misses surface as
    /// [`SessionError::Timeout`].
    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, SessionError>;

    async fn type_into(&self, element: &Self::Element, text: &str) -> Result<(), SessionError>;

    /// Clicks and waits for any navigation the click started
    async fn click(&self, element: &Self::Element) -> Result<(), SessionError>;

    /// Rendered text of the element
    async fn read_text(&self, element: &Self::Element) -> Result<String, SessionError>;

    /// Captures the whole current page
    async fn render_page(&self, kind: CaptureKind) -> Result<Vec<u8>, SessionError>;

    /// Releases the page and everything behind it
    async fn close(&self) -> Result<(), SessionError>;
}

/// Opens fresh sessions, one per record
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: BrowserSession + 'static;

    async fn open(&self) -> Result<Self::Session, SessionError>;
}
