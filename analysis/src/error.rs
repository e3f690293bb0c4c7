use engine::EvaluatorError;

/// Why an analysis produced no result. Every variant is fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid game record: {0}")]
    InvalidRecord(String),
    #[error("player {username:?} did not play this game")]
    PlayerNotFound { username: String },
    #[error(transparent)]
    EvaluatorUnavailable(#[from] EvaluatorError),
}

impl From<chess::PgnError> for AnalysisError {
    fn from(err: chess::PgnError) -> Self {
        Self::InvalidRecord(err.to_string())
    }
}
