pub mod locator;
pub mod record_flow;

pub use locator::Locator;
pub use record_flow::{RecordFlow, RetrievalOutcome, NOT_FOUND_MARKER, REJECTION_MARKER};
