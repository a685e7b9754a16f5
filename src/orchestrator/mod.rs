//! Orchestration layer
//!
//! ```text
//! range_runner (identifiers start..=end, Semaphore, summary)
//!     ↓
//! workflow::RecordFlow (one book)
//!     ↓
//! services::OutputWriter / browser::BrowserSession
//! ```
//!
//! Only this layer opens and closes browser sessions.

pub mod range_runner;

pub use range_runner::{process_record, App, RangeJob, RunSummary};
