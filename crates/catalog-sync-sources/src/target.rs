use anyhow::Result;
use async_trait::async_trait;
use catalog_sync_models::SearchCandidate;
use std::collections::HashMap;

/// Target-side entity kinds an external link can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artist,
    Release,
    ReleaseGroup,
}

impl EntityKind {
    /// Relation-include name used by the target API.
    pub fn rel_name(self) -> &'static str {
        match self {
            EntityKind::Artist => "artist",
            EntityKind::Release => "release",
            EntityKind::ReleaseGroup => "release-group",
        }
    }
}

/// A collection owned by the authenticated target user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    pub id: String,
    pub name: String,
}

/// The lookup/search/submit capability set of the target service.
///
/// The import pipeline only ever talks to this trait; whether an operation
/// went over the credentialed API or the web-session fallback is invisible
/// to it.
#[async_trait]
pub trait TargetCatalog {
    /// Find the target entity of `kind` whose stored external link points
    /// at `url`, restricted to links tagged as coming from the source
    /// system. A miss, including a not-found response, is `Ok(None)`.
    async fn lookup_by_source_url(&self, url: &str, kind: EntityKind) -> Result<Option<String>>;

    /// Parent release-group of a target release.
    async fn release_group_of(&self, release_id: &str) -> Result<Option<String>>;

    /// Title search for release-groups scoped to one artist, best scores
    /// first. Scores are on the target's 0-100 similarity scale.
    async fn search_release_groups(
        &self,
        title: &str,
        artist_id: &str,
    ) -> Result<Vec<SearchCandidate>>;

    /// Collections owned by the authenticated user.
    async fn collections(&self) -> Result<Vec<CollectionHandle>>;

    /// Create a release-group collection with the given name.
    async fn create_release_group_collection(&self, name: &str) -> Result<()>;

    /// Add release-groups to a collection. One call is one request, so
    /// callers chunk to stay under the URI length limit.
    async fn add_release_groups(
        &self,
        collection_id: &str,
        release_group_ids: &[String],
    ) -> Result<()>;

    /// Submit release-group ratings on the target's 0-100 scale, as one
    /// batched submission.
    async fn submit_release_group_ratings(&self, ratings: &HashMap<String, u8>) -> Result<()>;
}
