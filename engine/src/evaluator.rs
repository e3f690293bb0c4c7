//! The position-evaluation boundary.
//!
//! Analysis code depends only on [`PositionEvaluator`]. A request carries the
//! whole position, so implementations never rely on state left behind by an
//! earlier call. Methods take `&mut self`: an evaluator has one owner at a
//! time, and callers that need to share one wrap it in [`SharedEvaluator`].

use std::future::Future;
use std::sync::Arc;

use chess::AnalysisScore;
use tokio::sync::Mutex;

/// A position to evaluate, identified by its FEN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvaluationRequest {
    pub fen: String,
}

impl EvaluationRequest {
    pub fn new(fen: impl Into<String>) -> Self {
        Self { fen: fen.into() }
    }
}

/// Engine output for one position, from the side to move's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvaluation {
    pub score: AnalysisScore,
    /// Best move in UCI notation, `None` when the engine names none.
    pub best_move: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluatorError {
    #[error("evaluator unavailable: {0}")]
    Unavailable(String),
    #[error("evaluator timed out")]
    Timeout,
}

/// Something that can score a chess position and name its best move.
pub trait PositionEvaluator: Send {
    fn evaluate(
        &mut self,
        request: &EvaluationRequest,
    ) -> impl Future<Output = Result<EngineEvaluation, EvaluatorError>> + Send;
}

/// Cloneable handle that serializes access to one evaluator.
#[derive(Debug)]
pub struct SharedEvaluator<E> {
    inner: Arc<Mutex<E>>,
}

impl<E> Clone for SharedEvaluator<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: PositionEvaluator> SharedEvaluator<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            inner: Arc::new(Mutex::new(evaluator)),
        }
    }

    /// Recover the evaluator once every other handle is gone.
    pub fn into_inner(self) -> Result<E, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<E: PositionEvaluator> PositionEvaluator for SharedEvaluator<E> {
    async fn evaluate(
        &mut self,
        request: &EvaluationRequest,
    ) -> Result<EngineEvaluation, EvaluatorError> {
        let mut evaluator = self.inner.lock().await;
        evaluator.evaluate(request).await
    }
}
