use super::api::{self, MbError};
use super::web::WebSession;
use crate::target::{CollectionHandle, EntityKind, TargetCatalog};
use anyhow::Result;
use async_trait::async_trait;
use catalog_sync_models::SearchCandidate;
use std::collections::HashMap;
use std::time::Duration;

/// Credentialed client for the target metadata service. Write operations
/// go through the web service; collection creation falls back to the web
/// session since the web service cannot create release-group collections.
pub struct MusicBrainzClient {
    client: reqwest::Client,
    username: String,
    password: String,
    web: WebSession,
}

impl MusicBrainzClient {
    /// `contact` ends up in the user agent, which the target's etiquette
    /// asks of identifying clients.
    pub fn new(username: &str, password: &str, contact: Option<&str>) -> Result<Self> {
        let user_agent = match contact {
            Some(contact) => format!("shelfshift/0.1 ({})", contact),
            None => "shelfshift/0.1".to_string(),
        };
        let client = reqwest::Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            username: username.to_string(),
            password: password.to_string(),
            web: WebSession::new(&user_agent, username, password)?,
        })
    }

    fn auth(&self) -> (&str, &str) {
        (self.username.as_str(), self.password.as_str())
    }
}

#[async_trait]
impl TargetCatalog for MusicBrainzClient {
    async fn lookup_by_source_url(&self, url: &str, kind: EntityKind) -> Result<Option<String>> {
        match api::lookup_url_relation(&self.client, url, kind).await {
            Ok(found) => Ok(found),
            Err(MbError::NotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn release_group_of(&self, release_id: &str) -> Result<Option<String>> {
        match api::release_group_of(&self.client, release_id).await {
            Ok(found) => Ok(found),
            Err(MbError::NotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn search_release_groups(
        &self,
        title: &str,
        artist_id: &str,
    ) -> Result<Vec<SearchCandidate>> {
        Ok(api::search_release_groups(&self.client, title, artist_id).await?)
    }

    async fn collections(&self) -> Result<Vec<CollectionHandle>> {
        Ok(api::list_collections(&self.client, self.auth()).await?)
    }

    async fn create_release_group_collection(&self, name: &str) -> Result<()> {
        self.web.create_collection(name, "release group collection").await
    }

    async fn add_release_groups(
        &self,
        collection_id: &str,
        release_group_ids: &[String],
    ) -> Result<()> {
        Ok(api::add_release_groups(&self.client, self.auth(), collection_id, release_group_ids)
            .await?)
    }

    async fn submit_release_group_ratings(&self, ratings: &HashMap<String, u8>) -> Result<()> {
        Ok(api::submit_release_group_ratings(&self.client, self.auth(), ratings).await?)
    }
}
