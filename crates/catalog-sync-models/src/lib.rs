pub mod record;
pub mod resolved;

pub use record::{ArtistRef, ExportedRecord, ReleaseRef};
pub use resolved::{ConfidenceTier, ResolvedMatch, Resolution, SearchCandidate};
