use thiserror::Error;

/// Errors the summary engine can surface. Decode failures propagate to the
/// caller rather than producing a partially-filled summary, per spec.md
/// §4.7.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("failed to decode metrics_data for {metrics_code} as its expected shape: {source}")]
    ShapeMismatch {
        metrics_code: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to re-serialize metrics_data for {metrics_code}: {source}")]
    Reserialize {
        metrics_code: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SummaryError>;
