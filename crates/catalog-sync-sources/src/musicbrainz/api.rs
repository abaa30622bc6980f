//! Typed calls against the target's JSON web service.

use super::{CLIENT_ID, WS_BASE};
use crate::target::{CollectionHandle, EntityKind};
use catalog_sync_models::SearchCandidate;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// External-link relations tagged with this type come from the source
/// system and are authoritative cross-references.
const SOURCE_LINK_TYPE: &str = "discogs";

#[derive(Debug, Error)]
pub enum MbError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("not found")]
    NotFound,

    #[error("target API error {0}: {1}")]
    Api(u16, String),
}

#[derive(Debug, Deserialize)]
struct UrlLookup {
    #[serde(default)]
    relations: Vec<UrlRelation>,
}

#[derive(Debug, Deserialize)]
struct UrlRelation {
    #[serde(rename = "type")]
    relation_type: String,
    artist: Option<RelatedEntity>,
    release: Option<RelatedEntity>,
    #[serde(rename = "release-group")]
    release_group: Option<RelatedEntity>,
}

impl UrlRelation {
    fn entity_id(&self, kind: EntityKind) -> Option<&str> {
        let entity = match kind {
            EntityKind::Artist => self.artist.as_ref(),
            EntityKind::Release => self.release.as_ref(),
            EntityKind::ReleaseGroup => self.release_group.as_ref(),
        };
        entity.map(|entity| entity.id.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RelatedEntity {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseLookup {
    #[serde(rename = "release-group")]
    release_group: Option<RelatedEntity>,
}

#[derive(Debug, Deserialize)]
struct ReleaseGroupSearch {
    #[serde(rename = "release-groups", default)]
    release_groups: Vec<ReleaseGroupHit>,
}

#[derive(Debug, Deserialize)]
struct ReleaseGroupHit {
    id: String,
    title: String,
    score: u8,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
}

#[derive(Debug, Deserialize)]
struct ArtistCredit {
    name: String,
    #[serde(default)]
    joinphrase: String,
}

#[derive(Debug, Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<CollectionEntry>,
}

#[derive(Debug, Deserialize)]
struct CollectionEntry {
    id: String,
    name: String,
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    auth: Option<(&str, &str)>,
) -> Result<T, MbError> {
    let mut request = client.get(url);
    if let Some((username, password)) = auth {
        request = request.basic_auth(username, Some(password));
    }
    let response = request.send().await?;
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(MbError::NotFound);
    }
    if !status.is_success() {
        return Err(MbError::Api(
            status.as_u16(),
            response.text().await.unwrap_or_default(),
        ));
    }
    Ok(response.json().await?)
}

async fn check_write_response(response: reqwest::Response) -> Result<(), MbError> {
    let status = response.status();
    if !status.is_success() {
        return Err(MbError::Api(
            status.as_u16(),
            response.text().await.unwrap_or_default(),
        ));
    }
    Ok(())
}

/// Entity of `kind` whose stored external link points at `url`, restricted
/// to source-system relations.
pub async fn lookup_url_relation(
    client: &reqwest::Client,
    url: &str,
    kind: EntityKind,
) -> Result<Option<String>, MbError> {
    let request_url = format!(
        "{}/url?resource={}&inc={}-rels&fmt=json",
        WS_BASE,
        urlencoding::encode(url),
        kind.rel_name(),
    );
    let lookup: UrlLookup = get_json(client, &request_url, None).await?;
    let found = lookup
        .relations
        .iter()
        .filter(|relation| relation.relation_type == SOURCE_LINK_TYPE)
        .find_map(|relation| relation.entity_id(kind))
        .map(|id| id.to_string());
    debug!(url, kind = kind.rel_name(), hit = found.is_some(), "External-link lookup");
    Ok(found)
}

/// Parent release-group of a release.
pub async fn release_group_of(
    client: &reqwest::Client,
    release_id: &str,
) -> Result<Option<String>, MbError> {
    let request_url = format!("{}/release/{}?inc=release-groups&fmt=json", WS_BASE, release_id);
    let lookup: ReleaseLookup = get_json(client, &request_url, None).await?;
    Ok(lookup.release_group.map(|group| group.id))
}

/// Release-group title search scoped to one artist id, best scores first.
pub async fn search_release_groups(
    client: &reqwest::Client,
    title: &str,
    artist_id: &str,
) -> Result<Vec<SearchCandidate>, MbError> {
    let query = format!(
        r#"releasegroup:"{}" AND arid:{}"#,
        title.replace('"', " "),
        artist_id
    );
    let request_url = format!(
        "{}/release-group/?query={}&fmt=json",
        WS_BASE,
        urlencoding::encode(&query)
    );
    let search: ReleaseGroupSearch = get_json(client, &request_url, None).await?;
    Ok(search
        .release_groups
        .into_iter()
        .map(|hit| SearchCandidate {
            artist_credit: credit_phrase(&hit.artist_credit),
            id: hit.id,
            title: hit.title,
            score: hit.score,
        })
        .collect())
}

/// Collections owned by the authenticated user.
pub async fn list_collections(
    client: &reqwest::Client,
    auth: (&str, &str),
) -> Result<Vec<CollectionHandle>, MbError> {
    let request_url = format!("{}/collection?fmt=json", WS_BASE);
    let list: CollectionList = get_json(client, &request_url, Some(auth)).await?;
    Ok(list
        .collections
        .into_iter()
        .map(|entry| CollectionHandle {
            id: entry.id,
            name: entry.name,
        })
        .collect())
}

/// Add release-groups to a collection in one request. Ids travel in the
/// URL path joined with ';', so callers keep batches small.
pub async fn add_release_groups(
    client: &reqwest::Client,
    auth: (&str, &str),
    collection_id: &str,
    release_group_ids: &[String],
) -> Result<(), MbError> {
    let request_url = format!(
        "{}/collection/{}/release-groups/{}?client={}&fmt=json",
        WS_BASE,
        collection_id,
        release_group_ids.join(";"),
        CLIENT_ID
    );
    let response = client
        .put(&request_url)
        .basic_auth(auth.0, Some(auth.1))
        .send()
        .await?;
    check_write_response(response).await
}

/// One batched user-ratings submission. The write endpoint takes the
/// legacy XML envelope, not JSON.
pub async fn submit_release_group_ratings(
    client: &reqwest::Client,
    auth: (&str, &str),
    ratings: &HashMap<String, u8>,
) -> Result<(), MbError> {
    let request_url = format!("{}/rating?client={}&fmt=json", WS_BASE, CLIENT_ID);
    let response = client
        .post(&request_url)
        .basic_auth(auth.0, Some(auth.1))
        .header(CONTENT_TYPE, "application/xml; charset=utf-8")
        .body(ratings_xml(ratings))
        .send()
        .await?;
    check_write_response(response).await
}

fn ratings_xml(ratings: &HashMap<String, u8>) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    body.push_str(r#"<metadata xmlns="http://musicbrainz.org/ns/mmd-2.0#"><release-group-list>"#);
    for (id, rating) in ratings {
        body.push_str(&format!(
            r#"<release-group id="{}"><user-rating>{}</user-rating></release-group>"#,
            id, rating
        ));
    }
    body.push_str("</release-group-list></metadata>");
    body
}

fn credit_phrase(credits: &[ArtistCredit]) -> String {
    credits
        .iter()
        .map(|credit| format!("{}{}", credit.name, credit.joinphrase))
        .collect()
}
