pub mod checksum;
pub mod metadata;
pub mod record_id;
pub mod section;

pub use checksum::checksum;
pub use metadata::ExtractedMetadata;
pub use record_id::{RecordId, MAX_BOOK_NUMBER};
pub use section::{CaptureKind, Section};
