use serde::{Deserialize, Serialize};

/// Which resolution strategy produced a match, in decreasing order of
/// trustworthiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    /// The record's master URL had a stored external link on the target.
    ExactLink,
    /// The release URL matched a target release; the group came from the
    /// release's master entry.
    MasterDerived,
    /// The release URL's external link was attached at group level.
    ReleaseDerived,
    /// Title search scoped to a resolved artist.
    FuzzySearch,
}

/// A successful resolution always carries a target id; the no-match case
/// is a [`Resolution`] variant, not a nullable field here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMatch {
    pub target_id: String,
    pub tier: ConfidenceTier,
}

/// A fuzzy-search hit with its 0-100 similarity score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub id: String,
    pub title: String,
    pub artist_credit: String,
    pub score: u8,
}

/// Outcome of resolving one exported record. Computed per import run,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(ResolvedMatch),
    /// Several qualifying candidates with none clearly best. The caller
    /// decides how to surface them; nothing is auto-picked.
    Ambiguous(Vec<SearchCandidate>),
    Unmatched,
}
