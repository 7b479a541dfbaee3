use thiserror::Error;

/// Failures of the record store. `NotFound` is kept apart from storage-layer failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No profile ID found")]
    MissingProfileId,
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("record encoding failure: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Failures talking to a live page. Extraction code never surfaces these; callers degrade.
#[derive(Debug, Error)]
pub enum PageError {
    #[cfg(feature = "chrome")]
    #[error("script evaluation failed: {0}")]
    Evaluate(String),
    #[error("control {0} is no longer attached")]
    Detached(usize),
}
