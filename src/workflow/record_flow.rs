//! Record retrieval flow - workflow layer
//!
//! Defines the full processing of one book:
//!
//! 1. search (navigate → fill form → submit), retried after a cooldown while
//!    the site answers with its rejection page
//! 2. not found → stop without artifacts
//! 3. scrape header metadata → append CSV row → open the plain printout
//! 4. sections I-O, I-Sp, II, III, IV in order, each captured as the
//!    configured artifact kinds
//!
//! A missing section button skips only that section; the record then ends as
//! a partial success. The flow never opens or closes the session.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::{OutputError, RetrievalError, SessionError};
use crate::models::{CaptureKind, ExtractedMetadata, RecordId, Section};
use crate::services::OutputWriter;
use crate::workflow::locator::Locator;

/// Text of the page the site serves to rate-limited clients
pub const REJECTION_MARKER: &str = "The requested URL was rejected";

/// Text of the result area when no book matches
pub const NOT_FOUND_MARKER: &str = "nie została odnaleziona";

/// Outcome of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// Book downloaded; `missing_sections` lists skipped sections
    Found {
        metadata: ExtractedMetadata,
        missing_sections: Vec<Section>,
    },
    /// The register has no such book
    NotFound,
    /// Still rejected after all retries
    Blocked { attempts: u32 },
    /// A required element never appeared
    LookupError { locator: Locator },
}

impl RetrievalOutcome {
    /// Found, but at least one section was skipped
    pub fn is_partial(&self) -> bool {
        matches!(self, RetrievalOutcome::Found { missing_sections, .. } if !missing_sections.is_empty())
    }
}

/// Why the flow stopped early
enum FlowStop {
    Lookup(Locator),
    Failed(RetrievalError),
}

impl From<SessionError> for FlowStop {
    fn from(err: SessionError) -> Self {
        FlowStop::Failed(err.into())
    }
}

impl From<OutputError> for FlowStop {
    fn from(err: OutputError) -> Self {
        FlowStop::Failed(err.into())
    }
}

enum SearchState {
    Submitted,
    Blocked { attempts: u32 },
}

/// Record retrieval flow
///
/// Holds no browser resources; the session is passed into [`RecordFlow::run`].
pub struct RecordFlow {
    writer: Arc<OutputWriter>,
    search_url: String,
    element_timeout: Duration,
    block_cooldown: Duration,
    max_block_retries: u32,
    capture_kinds: Vec<CaptureKind>,
}

impl RecordFlow {
    pub fn new(config: &Config, writer: Arc<OutputWriter>) -> Self {
        Self {
            writer,
            search_url: config.search_url.clone(),
            element_timeout: config.element_timeout(),
            block_cooldown: config.block_cooldown(),
            max_block_retries: config.max_block_retries,
            capture_kinds: config.capture_kinds(),
        }
    }

    /// Retrieves one record
    ///
    /// # Returns
    /// The outcome, or an error when the session broke or an artifact could
    /// not be written
    pub async fn run<S: BrowserSession>(
        &self,
        session: &S,
        record: &RecordId,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        match self.run_steps(session, record).await {
            Ok(outcome) => Ok(outcome),
            Err(FlowStop::Lookup(locator)) => {
                warn!("[{}] ⚠️ Element {} not found, giving up", record, locator);
                Ok(RetrievalOutcome::LookupError { locator })
            }
            Err(FlowStop::Failed(e)) => Err(e),
        }
    }

    async fn run_steps<S: BrowserSession>(
        &self,
        session: &S,
        record: &RecordId,
    ) -> Result<RetrievalOutcome, FlowStop> {
        // ========== Search ==========
        if let SearchState::Blocked { attempts } = self.search(session, record).await? {
            warn!("[{}] ⚠️ Still rejected after {} attempts", record, attempts);
            return Ok(RetrievalOutcome::Blocked { attempts });
        }

        let result = self.find(session, Locator::ResultSection).await?;
        if session.read_text(&result).await?.contains(NOT_FOUND_MARKER) {
            warn!("[{}] Book not found", record);
            return Ok(RetrievalOutcome::NotFound);
        }

        // ========== Prepare ==========
        let metadata = self.scrape_metadata(session).await?;
        self.writer.append_csv_row(&metadata).await?;
        debug!("[{}] Metadata: {:?}", record, metadata);

        let printout = self.find(session, Locator::PlainPrintout).await?;
        session.click(&printout).await?;

        // ========== Sections ==========
        let mut missing_sections = Vec::new();
        for section in Section::ALL {
            match self.capture_section(session, record, section).await {
                Ok(()) => {}
                Err(FlowStop::Lookup(locator)) => {
                    warn!("[{}] ⚠️ {} not found, skipping section {}", record, locator, section);
                    missing_sections.push(section);
                }
                Err(stop) => return Err(stop),
            }
        }

        if missing_sections.is_empty() {
            info!("[{}] ✓ All sections saved", record);
        } else {
            info!(
                "[{}] ✓ Saved with {} section(s) missing",
                record,
                missing_sections.len()
            );
        }

        Ok(RetrievalOutcome::Found {
            metadata,
            missing_sections,
        })
    }

    /// Submits the search form, cooling down while the site rejects us
    async fn search<S: BrowserSession>(
        &self,
        session: &S,
        record: &RecordId,
    ) -> Result<SearchState, FlowStop> {
        let attempts = self.max_block_retries + 1;
        for attempt in 1..=attempts {
            if self.submit_search(session, record).await? {
                return Ok(SearchState::Submitted);
            }

            warn!(
                "[{}] ⚠️ Request rejected by the site (attempt {}/{})",
                record, attempt, attempts
            );
            if attempt < attempts {
                info!(
                    "[{}] Cooling down for {}s before retrying",
                    record,
                    self.block_cooldown.as_secs()
                );
                sleep(self.block_cooldown).await;
            }
        }
        Ok(SearchState::Blocked { attempts })
    }

    /// One search attempt; `false` when a rejection page came back
    async fn submit_search<S: BrowserSession>(
        &self,
        session: &S,
        record: &RecordId,
    ) -> Result<bool, FlowStop> {
        session.navigate(&self.search_url).await?;
        if self.is_rejected(session).await? {
            return Ok(false);
        }

        debug!("[{}] Filling search form", record);
        let fields = [
            (Locator::RegionInput, record.region().to_string()),
            (Locator::NumberInput, record.padded_number()),
            (Locator::CheckDigitInput, record.check_digit().to_string()),
        ];
        for (locator, value) in fields {
            let input = self.find(session, locator).await?;
            session.type_into(&input, &value).await?;
        }

        let submit = self.find(session, Locator::SearchButton).await?;
        session.click(&submit).await?;

        Ok(!self.is_rejected(session).await?)
    }

    async fn is_rejected<S: BrowserSession>(&self, session: &S) -> Result<bool, SessionError> {
        Ok(session.page_source().await?.contains(REJECTION_MARKER))
    }

    async fn scrape_metadata<S: BrowserSession>(
        &self,
        session: &S,
    ) -> Result<ExtractedMetadata, FlowStop> {
        let book_number = self.read_required(session, Locator::BookNumber).await?;
        let book_type = self.read_required(session, Locator::BookType).await?;
        let location = self
            .read_optional(session, Locator::Location)
            .await?
            .map(|line| ExtractedMetadata::parse_location(&line))
            .unwrap_or_default();
        let owner = self
            .read_optional(session, Locator::Owner)
            .await?
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        Ok(ExtractedMetadata {
            book_number: book_number.trim().to_string(),
            book_type: book_type.trim().to_string(),
            location,
            owner,
        })
    }

    async fn capture_section<S: BrowserSession>(
        &self,
        session: &S,
        record: &RecordId,
        section: Section,
    ) -> Result<(), FlowStop> {
        let button = self.find(session, Locator::SectionButton(section)).await?;
        session.click(&button).await?;
        debug!("[{}] Capturing section {}", record, section);

        for kind in &self.capture_kinds {
            let data = session.render_page(*kind).await?;
            self.writer
                .write_artifact(record, section, *kind, &data)
                .await?;
        }
        Ok(())
    }

    // ========== Lookup helpers ==========

    async fn find<S: BrowserSession>(
        &self,
        session: &S,
        locator: Locator,
    ) -> Result<S::Element, FlowStop> {
        let timeout = locator.timeout(self.element_timeout);
        session
            .wait_for_element(&locator.css(), timeout)
            .await
            .map_err(|e| {
                if e.is_lookup_miss() {
                    FlowStop::Lookup(locator)
                } else {
                    FlowStop::from(e)
                }
            })
    }

    async fn read_required<S: BrowserSession>(
        &self,
        session: &S,
        locator: Locator,
    ) -> Result<String, FlowStop> {
        let element = self.find(session, locator).await?;
        Ok(session.read_text(&element).await?)
    }

    /// `None` when the element is absent
    async fn read_optional<S: BrowserSession>(
        &self,
        session: &S,
        locator: Locator,
    ) -> Result<Option<String>, FlowStop> {
        match self.find(session, locator).await {
            Ok(element) => Ok(Some(session.read_text(&element).await?)),
            Err(FlowStop::Lookup(_)) => Ok(None),
            Err(stop) => Err(stop),
        }
    }
}
