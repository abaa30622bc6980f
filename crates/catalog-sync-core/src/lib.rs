pub mod export;
pub mod import;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_support;

pub use export::Exporter;
pub use import::{ImportReport, Importer};
pub use resolve::MatchResolver;

/// File names connecting the two pipelines.
pub const RATINGS_FILE: &str = "release-ratings.json";
pub const COLLECTION_FILE: &str = "collection.json";
pub const WANTLIST_FILE: &str = "wantlist.json";
