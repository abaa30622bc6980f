use serde::{Deserialize, Serialize};

/// One artist credited on an exported record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
    /// Name variation used on this particular release, when it differs
    /// from the artist's canonical name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_variation: Option<String>,
    pub source_url: String,
}

/// The release a record refers to. `source_url` is always the canonical
/// slug-free form, so its last path segment is the numeric source id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRef {
    pub name: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_url: Option<String>,
}

/// The interchange unit connecting the export and import pipelines.
/// Written once by the exporter, read once by the importer, never mutated.
///
/// Ratings records may legitimately have zero artists; the source listing
/// sometimes omits artist links for old entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedRecord {
    pub artists: Vec<ArtistRef>,
    pub release: ReleaseRef,
    /// Source-scale rating (1-5). Present only in ratings exports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(rating: Option<u8>) -> ExportedRecord {
        ExportedRecord {
            artists: vec![ArtistRef {
                name: "Boards of Canada".to_string(),
                name_variation: None,
                source_url: "https://www.discogs.com/artist/4531".to_string(),
            }],
            release: ReleaseRef {
                name: "Geogaddi".to_string(),
                source_url: "https://www.discogs.com/release/67913".to_string(),
                master_url: None,
            },
            rating,
        }
    }

    #[test]
    fn rating_is_omitted_when_absent() {
        let json = serde_json::to_value(sample_record(None)).unwrap();
        assert!(json.get("rating").is_none());
        assert!(json.get("release").unwrap().get("master_url").is_none());
    }

    #[test]
    fn rating_roundtrips() {
        let json = serde_json::to_string(&sample_record(Some(5))).unwrap();
        let back: ExportedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rating, Some(5));
        assert_eq!(back.artists[0].name, "Boards of Canada");
    }
}
