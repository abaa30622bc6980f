mod html;
mod rest;
pub mod urls;

pub use html::DiscogsHtmlClient;
pub use rest::DiscogsRestClient;

pub(crate) const WWW_BASE: &str = "https://www.discogs.com";
pub(crate) const API_BASE: &str = "https://api.discogs.com";
pub(crate) const USER_AGENT: &str = "shelfshift/0.1";
