use super::{API_BASE, USER_AGENT};
use crate::pagination::{self, RestPage, RetryPolicy};
use anyhow::{bail, Result};
use catalog_sync_models::{ArtistRef, ExportedRecord, ReleaseRef};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Identity {
    username: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    pages: u32,
}

#[derive(Debug, Deserialize)]
struct CollectionPage {
    pagination: Pagination,
    releases: Vec<ListedRelease>,
}

#[derive(Debug, Deserialize)]
struct WantlistPage {
    pagination: Pagination,
    wants: Vec<ListedRelease>,
}

#[derive(Debug, Deserialize)]
struct ListedRelease {
    basic_information: BasicInformation,
}

#[derive(Debug, Deserialize)]
struct BasicInformation {
    title: String,
    resource_url: String,
    master_url: Option<String>,
    #[serde(default)]
    artists: Vec<ArtistInfo>,
}

#[derive(Debug, Deserialize)]
struct ArtistInfo {
    name: String,
    #[serde(default)]
    anv: String,
    resource_url: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseDetail {
    master_url: Option<String>,
}

/// Token client for the source REST API: identity, collection and wantlist
/// listings, per-release detail.
pub struct DiscogsRestClient {
    client: reqwest::Client,
    token: String,
    username: String,
    per_page: u32,
    retry: RetryPolicy,
}

impl DiscogsRestClient {
    /// Build the client and discover the username via the identity endpoint.
    pub async fn connect(token: &str, per_page: u32, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let mut this = Self {
            client,
            token: token.to_string(),
            username: String::new(),
            per_page,
            retry,
        };
        let identity: Identity = this
            .get_json(&format!("{}/oauth/identity?token={}", API_BASE, token))
            .await?;
        debug!(username = %identity.username, "Authenticated against the source API");
        this.username = identity.username;
        Ok(this)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The "All" folder of the user's collection, flattened across pages.
    pub async fn collection(&self) -> Result<Vec<ExportedRecord>> {
        pagination::collect_rest_pages(|page| async move {
            let url = format!(
                "{}/users/{}/collection/folders/0/releases?page={}&per_page={}&token={}",
                API_BASE, self.username, page, self.per_page, self.token
            );
            let fetched: CollectionPage = self.get_json(&url).await?;
            Ok(RestPage {
                total_pages: fetched.pagination.pages,
                items: fetched.releases.into_iter().map(to_record).collect(),
            })
        })
        .await
    }

    /// The user's wantlist, flattened across pages.
    pub async fn wantlist(&self) -> Result<Vec<ExportedRecord>> {
        pagination::collect_rest_pages(|page| async move {
            let url = format!(
                "{}/users/{}/wants?page={}&per_page={}&token={}",
                API_BASE, self.username, page, self.per_page, self.token
            );
            let fetched: WantlistPage = self.get_json(&url).await?;
            Ok(RestPage {
                total_pages: fetched.pagination.pages,
                items: fetched.wants.into_iter().map(to_record).collect(),
            })
        })
        .await
    }

    /// Master URL of one release, used to enrich ratings exports.
    pub async fn release_master_url(&self, release_id: &str) -> Result<Option<String>> {
        let url = format!("{}/releases/{}?token={}", API_BASE, release_id, self.token);
        let detail: ReleaseDetail = self.get_json(&url).await?;
        Ok(detail.master_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = pagination::get_with_backoff(&self.client, url, &self.retry).await?;
        let status = response.status();
        if !status.is_success() {
            bail!(
                "Source API request failed: {} - {}",
                status,
                response.text().await.unwrap_or_default()
            );
        }
        Ok(response.json().await?)
    }
}

fn to_record(listed: ListedRelease) -> ExportedRecord {
    let info = listed.basic_information;
    ExportedRecord {
        artists: info
            .artists
            .into_iter()
            .map(|artist| ArtistRef {
                name_variation: if artist.anv.is_empty() {
                    None
                } else {
                    Some(artist.anv)
                },
                name: artist.name,
                source_url: artist.resource_url,
            })
            .collect(),
        release: ReleaseRef {
            name: info.title,
            source_url: info.resource_url,
            master_url: info.master_url,
        },
        rating: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_envelope_maps_to_records() {
        let body = r#"{
            "pagination": {"page": 1, "pages": 2, "items": 3},
            "releases": [{
                "basic_information": {
                    "title": "Geogaddi",
                    "resource_url": "https://api.discogs.com/releases/67913",
                    "master_url": "https://api.discogs.com/masters/1103",
                    "artists": [{
                        "name": "Boards of Canada",
                        "anv": "BoC",
                        "resource_url": "https://api.discogs.com/artists/4531"
                    }]
                }
            }]
        }"#;
        let page: CollectionPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.pagination.pages, 2);

        let record = to_record(page.releases.into_iter().next().unwrap());
        assert_eq!(record.release.name, "Geogaddi");
        assert_eq!(record.release.master_url.as_deref(), Some("https://api.discogs.com/masters/1103"));
        assert_eq!(record.artists[0].name_variation.as_deref(), Some("BoC"));
        assert_eq!(record.rating, None);
    }

    #[test]
    fn empty_anv_becomes_no_variation() {
        let body = r#"{
            "basic_information": {
                "title": "X",
                "resource_url": "https://api.discogs.com/releases/1",
                "master_url": null,
                "artists": [{"name": "Y", "anv": "", "resource_url": "https://api.discogs.com/artists/2"}]
            }
        }"#;
        let listed: ListedRelease = serde_json::from_str(body).unwrap();
        let record = to_record(listed);
        assert_eq!(record.artists[0].name_variation, None);
        assert_eq!(record.release.master_url, None);
    }

    #[test]
    fn wantlist_envelope_parses() {
        let body = r#"{
            "pagination": {"pages": 1},
            "wants": [{
                "basic_information": {
                    "title": "Music Has the Right to Children",
                    "resource_url": "https://api.discogs.com/releases/3039",
                    "master_url": null,
                    "artists": []
                }
            }]
        }"#;
        let page: WantlistPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.wants.len(), 1);
    }
}
