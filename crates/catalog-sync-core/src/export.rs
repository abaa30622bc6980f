use anyhow::{Context, Result};
use catalog_sync_models::ExportedRecord;
use catalog_sync_sources::discogs::urls;
use catalog_sync_sources::{DiscogsHtmlClient, DiscogsRestClient};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Serialize a record array to `dir/filename`, creating the directory.
pub fn write_records(dir: &Path, filename: &str, records: &[ExportedRecord]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(filename);
    let json = serde_json::to_string(records)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "Wrote export file");
    Ok(path)
}

/// Drives the export side: ratings via the HTML session, collection and
/// wantlist via the token API, each into its own JSON file.
pub struct Exporter {
    html: DiscogsHtmlClient,
    rest: DiscogsRestClient,
    export_dir: PathBuf,
    master_lookup_throttle: Duration,
}

impl Exporter {
    pub fn new(
        html: DiscogsHtmlClient,
        rest: DiscogsRestClient,
        export_dir: PathBuf,
        master_lookup_throttle: Duration,
    ) -> Self {
        Self {
            html,
            rest,
            export_dir,
            master_lookup_throttle,
        }
    }

    /// All three record collections.
    pub async fn export_all(&self, include_masters: bool) -> Result<()> {
        self.export_release_ratings(include_masters).await?;
        self.export_collection().await?;
        self.export_wantlist().await?;
        Ok(())
    }

    /// Ratings listing into `release-ratings.json`. With `include_masters`
    /// each record also gets its master URL from the API, which costs one
    /// throttled request per record but makes import resolution cheaper.
    pub async fn export_release_ratings(&self, include_masters: bool) -> Result<PathBuf> {
        let mut records = self.html.release_ratings().await?;
        info!(records = records.len(), "Fetched rated releases");
        if include_masters {
            self.fill_master_urls(&mut records).await?;
        }
        write_records(&self.export_dir, crate::RATINGS_FILE, &records)
    }

    /// Collection listing into `collection.json`.
    pub async fn export_collection(&self) -> Result<PathBuf> {
        let records = self.rest.collection().await?;
        info!(records = records.len(), "Fetched collection");
        write_records(&self.export_dir, crate::COLLECTION_FILE, &records)
    }

    /// Wantlist into `wantlist.json`.
    pub async fn export_wantlist(&self) -> Result<PathBuf> {
        let records = self.rest.wantlist().await?;
        info!(records = records.len(), "Fetched wantlist");
        write_records(&self.export_dir, crate::WANTLIST_FILE, &records)
    }

    async fn fill_master_urls(&self, records: &mut [ExportedRecord]) -> Result<()> {
        for record in records.iter_mut() {
            let Some(release_id) = urls::release_id(&record.release.source_url) else {
                warn!(url = %record.release.source_url, "Release URL has no numeric id, skipping master lookup");
                continue;
            };
            record.release.master_url = self.rest.release_master_url(release_id).await?;
            // one extra request per record; stay under the API rate limit
            tokio::time::sleep(self.master_lookup_throttle).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::load_records;
    use crate::test_support::record_numbered;
    use tempfile::TempDir;

    #[test]
    fn written_records_load_back_in_order() {
        let dir = TempDir::new().unwrap();
        let records: Vec<_> = (0..5).map(|n| record_numbered(n, Some(3))).collect();

        let path = write_records(dir.path(), crate::RATINGS_FILE, &records).unwrap();
        assert!(path.ends_with(crate::RATINGS_FILE));

        let loaded = load_records(dir.path(), crate::RATINGS_FILE).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        write_records(&nested, crate::WANTLIST_FILE, &[]).unwrap();
        assert!(nested.join(crate::WANTLIST_FILE).exists());
    }
}
