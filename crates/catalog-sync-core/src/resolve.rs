use anyhow::Result;
use catalog_sync_models::{
    ConfidenceTier, ExportedRecord, ResolvedMatch, Resolution, SearchCandidate,
};
use catalog_sync_sources::discogs::urls;
use catalog_sync_sources::{EntityKind, TargetCatalog};
use tracing::debug;

/// Candidates at or above this similarity qualify for consideration.
const QUALIFYING_SCORE: u8 = 75;
/// A candidate above this is unambiguous and accepted immediately.
const UNAMBIGUOUS_SCORE: u8 = 95;

/// Resolves exported records to target release-groups. Strategies run in
/// decreasing order of confidence and increasing cost: stored external
/// links first, fuzzy title search last. The first hit wins.
pub struct MatchResolver<'a, C: TargetCatalog> {
    target: &'a C,
}

impl<'a, C: TargetCatalog> MatchResolver<'a, C> {
    pub fn new(target: &'a C) -> Self {
        Self { target }
    }

    pub async fn resolve(&self, record: &ExportedRecord) -> Result<Resolution> {
        if let Some(found) = self.via_master_link(record).await {
            return Ok(Resolution::Matched(found));
        }
        if let Some(found) = self.via_release_link(record).await {
            return Ok(Resolution::Matched(found));
        }
        self.via_search(record).await
    }

    /// Strategy 1: the record's master URL has a stored external link.
    async fn via_master_link(&self, record: &ExportedRecord) -> Option<ResolvedMatch> {
        let master_url = record.release.master_url.as_deref()?;
        let www = urls::api_url_to_www(master_url);
        self.lookup_or_miss(&www, EntityKind::ReleaseGroup)
            .await
            .map(|target_id| ResolvedMatch {
                target_id,
                tier: ConfidenceTier::ExactLink,
            })
    }

    /// Strategy 2: the release URL resolves via external link, either to a
    /// release whose master entry names the group, or to a group directly.
    async fn via_release_link(&self, record: &ExportedRecord) -> Option<ResolvedMatch> {
        let www = urls::api_url_to_www(&record.release.source_url);
        if let Some(release_id) = self.lookup_or_miss(&www, EntityKind::Release).await {
            match self.target.release_group_of(&release_id).await {
                Ok(Some(group_id)) => {
                    return Some(ResolvedMatch {
                        target_id: group_id,
                        tier: ConfidenceTier::MasterDerived,
                    });
                }
                Ok(None) => {}
                Err(error) => {
                    debug!(%release_id, %error, "Release lookup failed, continuing cascade");
                }
            }
        }
        // Some source links sit at group level instead of on a release.
        self.lookup_or_miss(&www, EntityKind::ReleaseGroup)
            .await
            .map(|group_id| ResolvedMatch {
                target_id: group_id,
                tier: ConfidenceTier::ReleaseDerived,
            })
    }

    /// Strategy 3: title search scoped to each artist the target knows.
    async fn via_search(&self, record: &ExportedRecord) -> Result<Resolution> {
        let mut qualifying: Vec<SearchCandidate> = Vec::new();
        for artist in &record.artists {
            let www = urls::api_url_to_www(&artist.source_url);
            let Some(artist_id) = self.lookup_or_miss(&www, EntityKind::Artist).await else {
                debug!(artist = %artist.name, "Artist has no external link, skipping");
                continue;
            };
            let candidates = self
                .target
                .search_release_groups(&record.release.name, &artist_id)
                .await?;
            if let Some(best) = candidates
                .iter()
                .find(|candidate| candidate.score > UNAMBIGUOUS_SCORE)
            {
                return Ok(Resolution::Matched(ResolvedMatch {
                    target_id: best.id.clone(),
                    tier: ConfidenceTier::FuzzySearch,
                }));
            }
            qualifying.extend(
                candidates
                    .into_iter()
                    .filter(|candidate| candidate.score >= QUALIFYING_SCORE),
            );
        }

        qualifying.sort_by(|a, b| b.score.cmp(&a.score));
        match qualifying.len() {
            0 => Ok(Resolution::Unmatched),
            1 => Ok(Resolution::Matched(ResolvedMatch {
                target_id: qualifying.remove(0).id,
                tier: ConfidenceTier::FuzzySearch,
            })),
            _ => Ok(Resolution::Ambiguous(qualifying)),
        }
    }

    /// External-link lookups that error are misses, never fatal; the
    /// cascade moves on to the next strategy.
    async fn lookup_or_miss(&self, url: &str, kind: EntityKind) -> Option<String> {
        match self.target.lookup_by_source_url(url, kind).await {
            Ok(found) => found,
            Err(error) => {
                debug!(url, %error, "External-link lookup failed, treating as miss");
                None
            }
        }
    }
}
