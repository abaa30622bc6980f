pub mod discogs;
pub mod error;
pub mod musicbrainz;
pub mod pagination;
pub mod target;

pub use discogs::{DiscogsHtmlClient, DiscogsRestClient};
pub use error::ExtractError;
pub use musicbrainz::MusicBrainzClient;
pub use pagination::RetryPolicy;
pub use target::{CollectionHandle, EntityKind, TargetCatalog};
