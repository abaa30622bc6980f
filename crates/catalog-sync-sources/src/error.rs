use thiserror::Error;

/// Structural failure while extracting records from a listing page. Fatal
/// for the whole page; there is no partial-row recovery.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("row {row}: no release anchor in title cell")]
    MissingRelease { row: usize },

    #[error("row {row}: no rating element")]
    MissingRating { row: usize },

    #[error("row {row}: rating value {value:?} is not numeric")]
    BadRatingValue { row: usize, value: String },
}
