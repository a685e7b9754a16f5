//! # eKW fetch
//!
//! Downloads books of the Polish electronic land and mortgage register
//! (Elektroniczne Księgi Wieczyste) through its public browser.
//!
//! ## Layers
//!
//! ### ① Infrastructure
//! - `browser/` - the `BrowserSession` capability and the Chrome launcher
//! - `infrastructure/` - `PageDriver`, the only owner of a Chrome page
//!
//! ### ② Capabilities
//! - `services/` - `OutputWriter`: artifact files and the shared CSV
//!
//! ### ③ Workflow
//! - `workflow/` - `RecordFlow`: search → classify → metadata → five sections
//!
//! ### ④ Orchestration
//! - `orchestrator/` - identifier range, bounded concurrency, run summary
//!
//! `models/` holds the identifier, its checksum and the scraped metadata.

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use browser::{BrowserSession, ChromeLauncher, SessionFactory};
pub use config::{BrowserKind, Config};
pub use error::{AppError, AppResult};
pub use infrastructure::PageDriver;
pub use models::{checksum, CaptureKind, ExtractedMetadata, RecordId, Section};
pub use orchestrator::{App, RangeJob, RunSummary};
pub use services::OutputWriter;
pub use workflow::{Locator, RecordFlow, RetrievalOutcome};
