use anyhow::Result;
use async_trait::async_trait;
use catalog_sync_models::{ArtistRef, ExportedRecord, ReleaseRef, SearchCandidate};
use catalog_sync_sources::{CollectionHandle, EntityKind, TargetCatalog};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory target catalog with call counters, for cascade and import
/// pipeline tests.
#[derive(Default)]
pub struct MockTarget {
    pub url_links: HashMap<(String, EntityKind), String>,
    pub release_groups: HashMap<String, String>,
    pub search_results: HashMap<String, Vec<SearchCandidate>>,
    pub existing_collections: Vec<CollectionHandle>,

    pub lookups: AtomicUsize,
    pub release_fetches: AtomicUsize,
    pub searches: AtomicUsize,
    pub creates: AtomicUsize,
    pub created_names: Mutex<Vec<String>>,
    pub submitted_batches: Mutex<Vec<Vec<String>>>,
    pub rating_submissions: AtomicUsize,
    pub submitted_ratings: Mutex<HashMap<String, u8>>,
}

#[async_trait]
impl TargetCatalog for MockTarget {
    async fn lookup_by_source_url(&self, url: &str, kind: EntityKind) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.url_links.get(&(url.to_string(), kind)).cloned())
    }

    async fn release_group_of(&self, release_id: &str) -> Result<Option<String>> {
        self.release_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.release_groups.get(release_id).cloned())
    }

    async fn search_release_groups(
        &self,
        _title: &str,
        artist_id: &str,
    ) -> Result<Vec<SearchCandidate>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.search_results.get(artist_id).cloned().unwrap_or_default())
    }

    async fn collections(&self) -> Result<Vec<CollectionHandle>> {
        let mut collections = self.existing_collections.clone();
        for (index, name) in self.created_names.lock().unwrap().iter().enumerate() {
            collections.push(CollectionHandle {
                id: format!("created-{}", index),
                name: name.clone(),
            });
        }
        Ok(collections)
    }

    async fn create_release_group_collection(&self, name: &str) -> Result<()> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.created_names.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn add_release_groups(
        &self,
        _collection_id: &str,
        release_group_ids: &[String],
    ) -> Result<()> {
        self.submitted_batches
            .lock()
            .unwrap()
            .push(release_group_ids.to_vec());
        Ok(())
    }

    async fn submit_release_group_ratings(&self, ratings: &HashMap<String, u8>) -> Result<()> {
        self.rating_submissions.fetch_add(1, Ordering::SeqCst);
        self.submitted_ratings
            .lock()
            .unwrap()
            .extend(ratings.iter().map(|(id, rating)| (id.clone(), *rating)));
        Ok(())
    }
}

pub fn candidate(id: &str, score: u8) -> SearchCandidate {
    SearchCandidate {
        id: id.to_string(),
        title: format!("title of {}", id),
        artist_credit: "Someone".to_string(),
        score,
    }
}

/// A ratings-style record whose release URL carries the given numeric id.
pub fn record_numbered(number: u32, rating: Option<u8>) -> ExportedRecord {
    ExportedRecord {
        artists: vec![],
        release: ReleaseRef {
            name: format!("Release {}", number),
            source_url: format!("https://www.discogs.com/release/{}", number),
            master_url: Some(format!("https://www.discogs.com/master/{}", number)),
        },
        rating,
    }
}

pub fn record_with_master(master_url: &str) -> ExportedRecord {
    ExportedRecord {
        artists: vec![],
        release: ReleaseRef {
            name: "Geogaddi".to_string(),
            source_url: "https://www.discogs.com/release/67913".to_string(),
            master_url: Some(master_url.to_string()),
        },
        rating: Some(5),
    }
}

pub fn record_with_artist(artist_url: Option<&str>) -> ExportedRecord {
    ExportedRecord {
        artists: artist_url
            .map(|url| {
                vec![ArtistRef {
                    name: "Boards of Canada".to_string(),
                    name_variation: None,
                    source_url: url.to_string(),
                }]
            })
            .unwrap_or_default(),
        release: ReleaseRef {
            name: "Geogaddi".to_string(),
            source_url: "https://www.discogs.com/release/67913".to_string(),
            master_url: None,
        },
        rating: None,
    }
}
