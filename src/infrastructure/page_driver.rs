//! Chrome page driver - infrastructure layer
//!
//! Owns one Chrome process and its single page, and exposes them only as
//! the [`BrowserSession`] capability.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::browser::session::BrowserSession;
use crate::error::SessionError;
use crate::models::CaptureKind;

/// A4 in inches
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Chrome-backed browser session
pub struct PageDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
    poll_interval: Duration,
}

impl PageDriver {
    pub fn new(
        browser: Browser,
        page: Page,
        handler: JoinHandle<()>,
        profile_dir: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            browser: Mutex::new(browser),
            page,
            handler,
            profile_dir,
            poll_interval,
        }
    }

    async fn print_pdf(&self) -> Result<Vec<u8>, SessionError> {
        let params = PrintToPdfParams {
            landscape: Some(true),
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            ..Default::default()
        };
        Ok(self.page.pdf(params).await?)
    }

    async fn full_screenshot(&self) -> Result<Vec<u8>, SessionError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn body_text(&self) -> Result<Vec<u8>, SessionError> {
        let body = self.page.find_element("body").await?;
        Ok(body.inner_text().await?.unwrap_or_default().into_bytes())
    }
}

#[async_trait]
impl BrowserSession for PageDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String, SessionError> {
        Ok(self.page.content().await?)
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(e) => {
                    if Instant::now() >= deadline {
                        debug!("Lookup of '{}' gave up: {}", selector, e);
                        return Err(SessionError::Timeout {
                            selector: selector.to_string(),
                            waited: timeout,
                        });
                    }
                }
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn type_into(&self, element: &Element, text: &str) -> Result<(), SessionError> {
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<(), SessionError> {
        element.click().await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn read_text(&self, element: &Element) -> Result<String, SessionError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn render_page(&self, kind: CaptureKind) -> Result<Vec<u8>, SessionError> {
        match kind {
            CaptureKind::Pdf => self.print_pdf().await,
            CaptureKind::Png => self.full_screenshot().await,
            CaptureKind::Text => self.body_text().await,
        }
    }

    async fn close(&self) -> Result<(), SessionError> {
        if let Err(e) = self.page.clone().close().await {
            debug!("Page already gone: {}", e);
        }

        let mut browser = self.browser.lock().await;
        let result = match browser.close().await {
            Ok(_) => {
                let _ = browser.wait().await;
                Ok(())
            }
            Err(e) => Err(SessionError::from(e)),
        };
        self.handler.abort();

        if let Err(e) = tokio::fs::remove_dir_all(&self.profile_dir).await {
            warn!(
                "Could not remove browser profile {}: {}",
                self.profile_dir.display(),
                e
            );
        }
        result
    }
}
