use crate::resolve::MatchResolver;
use anyhow::{anyhow, Context, Result};
use catalog_sync_models::{ExportedRecord, Resolution, SearchCandidate};
use catalog_sync_sources::{CollectionHandle, TargetCatalog};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Ids per collection request. They travel in the URL path, and the
/// transport caps URI length around twice this many ids.
pub const SUBMISSION_CHUNK_SIZE: usize = 200;

/// Source ratings are 1-5; the target rates release-groups on 0-100.
pub fn to_target_rating(source_rating: u8) -> u8 {
    source_rating * 20
}

/// Read an exported record array written by the export pipeline.
pub fn load_records(import_dir: &Path, filename: &str) -> Result<Vec<ExportedRecord>> {
    let path = import_dir.join(filename);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid record array", path.display()))
}

/// What one import step did with its records.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub resolved: usize,
    pub unmatched: usize,
    /// Release name plus its qualifying candidates, for the caller to
    /// surface. Ambiguous records are not submitted.
    pub ambiguous: Vec<(String, Vec<SearchCandidate>)>,
}

/// Drives the import side: resolve records against the target catalog,
/// then submit ratings and collection memberships.
pub struct Importer<'a, C: TargetCatalog> {
    target: &'a C,
    resolver: MatchResolver<'a, C>,
}

impl<'a, C: TargetCatalog> Importer<'a, C> {
    pub fn new(target: &'a C) -> Self {
        Self {
            target,
            resolver: MatchResolver::new(target),
        }
    }

    /// Resolve ratings records and submit one batched ratings request.
    /// Unmatched records are dropped; ambiguous ones surfaced and dropped.
    pub async fn import_ratings(&self, import_dir: &Path) -> Result<ImportReport> {
        let records = load_records(import_dir, crate::RATINGS_FILE)?;
        let mut report = ImportReport::default();
        let mut ratings: HashMap<String, u8> = HashMap::new();

        for record in &records {
            let Some(source_rating) = record.rating else {
                warn!(release = %record.release.name, "Ratings record without a rating, skipping");
                continue;
            };
            match self.resolver.resolve(record).await? {
                Resolution::Matched(found) => {
                    report.resolved += 1;
                    ratings.insert(found.target_id, to_target_rating(source_rating));
                }
                Resolution::Ambiguous(candidates) => {
                    report.ambiguous.push((record.release.name.clone(), candidates));
                }
                Resolution::Unmatched => {
                    debug!(release = %record.release.name, "No target match for rating");
                    report.unmatched += 1;
                }
            }
        }

        if !ratings.is_empty() {
            self.target.submit_release_group_ratings(&ratings).await?;
            info!(submitted = ratings.len(), "Submitted release-group ratings");
        }
        Ok(report)
    }

    /// Owned releases into the named collection.
    pub async fn import_owned(&self, import_dir: &Path, collection_name: &str) -> Result<ImportReport> {
        self.import_collection(import_dir, crate::COLLECTION_FILE, collection_name)
            .await
    }

    /// Wantlist entries into the named collection.
    pub async fn import_wishlist(
        &self,
        import_dir: &Path,
        collection_name: &str,
    ) -> Result<ImportReport> {
        self.import_collection(import_dir, crate::WANTLIST_FILE, collection_name)
            .await
    }

    async fn import_collection(
        &self,
        import_dir: &Path,
        filename: &str,
        collection_name: &str,
    ) -> Result<ImportReport> {
        let records = load_records(import_dir, filename)?;
        let collection = self.ensure_collection(collection_name).await?;

        let mut report = ImportReport::default();
        let mut ids = Vec::new();
        for record in &records {
            match self.resolver.resolve(record).await? {
                Resolution::Matched(found) => {
                    report.resolved += 1;
                    ids.push(found.target_id);
                }
                Resolution::Ambiguous(candidates) => {
                    report.ambiguous.push((record.release.name.clone(), candidates));
                }
                Resolution::Unmatched => {
                    debug!(release = %record.release.name, "No target match, dropping record");
                    report.unmatched += 1;
                }
            }
        }

        for chunk in ids.chunks(SUBMISSION_CHUNK_SIZE) {
            self.target.add_release_groups(&collection.id, chunk).await?;
        }
        info!(collection = %collection.name, added = ids.len(), "Added release-groups to collection");
        Ok(report)
    }

    /// Find the named collection, creating it first when the user has none
    /// by that exact name. Re-running an import therefore reuses the
    /// collection instead of duplicating it.
    async fn ensure_collection(&self, name: &str) -> Result<CollectionHandle> {
        if let Some(existing) = self.find_collection(name).await? {
            debug!(collection = %existing.name, id = %existing.id, "Using existing collection");
            return Ok(existing);
        }
        info!(collection = name, "Creating collection on the target");
        self.target.create_release_group_collection(name).await?;
        self.find_collection(name)
            .await?
            .ok_or_else(|| anyhow!("Collection {:?} still missing after creation", name))
    }

    async fn find_collection(&self, name: &str) -> Result<Option<CollectionHandle>> {
        Ok(self
            .target
            .collections()
            .await?
            .into_iter()
            .find(|collection| collection.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::write_records;
    use crate::test_support::{record_numbered, MockTarget};
    use catalog_sync_sources::EntityKind;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    /// Mock where every record's master URL resolves to "rg-{n}".
    fn target_resolving(count: u32) -> MockTarget {
        let mut target = MockTarget::default();
        for number in 0..count {
            target.url_links.insert(
                (
                    format!("https://www.discogs.com/master/{}", number),
                    EntityKind::ReleaseGroup,
                ),
                format!("rg-{}", number),
            );
        }
        target
    }

    #[test]
    fn ratings_scale_maps_one_to_five_onto_percent() {
        assert_eq!(to_target_rating(1), 20);
        assert_eq!(to_target_rating(4), 80);
        assert_eq!(to_target_rating(5), 100);
    }

    #[tokio::test]
    async fn submissions_chunk_at_two_hundred_ids() {
        let dir = TempDir::new().unwrap();
        let records: Vec<_> = (0..450).map(|n| record_numbered(n, None)).collect();
        write_records(dir.path(), crate::COLLECTION_FILE, &records).unwrap();

        let mut target = target_resolving(450);
        target.existing_collections.push(CollectionHandle {
            id: "c1".to_string(),
            name: "Owned".to_string(),
        });

        let importer = Importer::new(&target);
        let report = importer.import_owned(dir.path(), "Owned").await.unwrap();

        assert_eq!(report.resolved, 450);
        assert_eq!(report.unmatched, 0);

        let batches = target.submitted_batches.lock().unwrap();
        let sizes: Vec<usize> = batches.iter().map(|batch| batch.len()).collect();
        assert_eq!(sizes, vec![200, 200, 50]);
        // order is preserved across chunks
        assert_eq!(batches[0][0], "rg-0");
        assert_eq!(batches[2][49], "rg-449");
    }

    #[tokio::test]
    async fn existing_collection_is_reused() {
        let dir = TempDir::new().unwrap();
        write_records(dir.path(), crate::COLLECTION_FILE, &[record_numbered(0, None)]).unwrap();

        let mut target = target_resolving(1);
        target.existing_collections.push(CollectionHandle {
            id: "c1".to_string(),
            name: "Owned".to_string(),
        });

        let importer = Importer::new(&target);
        importer.import_owned(dir.path(), "Owned").await.unwrap();

        assert_eq!(target.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_collection_is_created_once() {
        let dir = TempDir::new().unwrap();
        write_records(dir.path(), crate::WANTLIST_FILE, &[record_numbered(0, None)]).unwrap();

        let target = target_resolving(1);
        let importer = Importer::new(&target);
        importer.import_wishlist(dir.path(), "Wishlist").await.unwrap();

        assert_eq!(target.creates.load(Ordering::SeqCst), 1);
        assert_eq!(target.created_names.lock().unwrap().as_slice(), ["Wishlist"]);
        // the new collection received the batch
        assert_eq!(target.submitted_batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ratings_import_converts_and_batches() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record_numbered(0, Some(4)),
            record_numbered(1, Some(5)),
            // record without a rating is skipped, not an error
            record_numbered(2, None),
        ];
        write_records(dir.path(), crate::RATINGS_FILE, &records).unwrap();

        let target = target_resolving(3);
        let importer = Importer::new(&target);
        let report = importer.import_ratings(dir.path()).await.unwrap();

        assert_eq!(report.resolved, 2);
        // one batched submission carrying both converted ratings
        assert_eq!(target.rating_submissions.load(Ordering::SeqCst), 1);
        let submitted = target.submitted_ratings.lock().unwrap();
        assert_eq!(submitted.get("rg-0"), Some(&80));
        assert_eq!(submitted.get("rg-1"), Some(&100));
        assert_eq!(submitted.len(), 2);
    }

    #[tokio::test]
    async fn nothing_resolved_means_no_ratings_request() {
        let dir = TempDir::new().unwrap();
        // resolvable against an empty target catalog: nothing
        write_records(dir.path(), crate::RATINGS_FILE, &[record_numbered(0, Some(4))]).unwrap();

        let target = MockTarget::default();
        let importer = Importer::new(&target);
        let report = importer.import_ratings(dir.path()).await.unwrap();

        assert_eq!(report.resolved, 0);
        assert_eq!(report.unmatched, 1);
        assert_eq!(target.rating_submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_records_are_dropped_not_fatal() {
        let dir = TempDir::new().unwrap();
        write_records(dir.path(), crate::COLLECTION_FILE, &[record_numbered(7, None)]).unwrap();

        let mut target = MockTarget::default();
        target.existing_collections.push(CollectionHandle {
            id: "c1".to_string(),
            name: "Owned".to_string(),
        });

        let importer = Importer::new(&target);
        let report = importer.import_owned(dir.path(), "Owned").await.unwrap();

        assert_eq!(report.resolved, 0);
        assert_eq!(report.unmatched, 1);
        assert!(target.submitted_batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_export_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let target = MockTarget::default();
        let importer = Importer::new(&target);
        assert!(importer.import_ratings(dir.path()).await.is_err());
    }
}
