mod api;
mod client;
mod web;

pub use api::MbError;
pub use client::MusicBrainzClient;
pub use web::WebSession;

pub(crate) const WS_BASE: &str = "https://musicbrainz.org/ws/2";
pub(crate) const WEB_BASE: &str = "https://musicbrainz.org";

/// Client identifier sent with write requests, as the target asks of
/// submitting applications.
pub(crate) const CLIENT_ID: &str = "shelfshift-0.1";
