use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chess::format_fen;
use cozy_chess::Board;
use engine::{EvaluationRequest, EvaluatorError, PositionEvaluator};
use tokio::sync::RwLock;

use crate::evaluation::Evaluation;

/// Memoized engine evaluations keyed by FEN.
///
/// The engine is deterministic for a fixed configuration, so entries are
/// never invalidated and the map only grows. Share one cache between
/// analyzers through an `Arc` to reuse evaluations across games.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    entries: RwLock<HashMap<String, Evaluation>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `board`, asking `evaluator` only on a cache miss.
    ///
    /// Positions without legal moves are scored directly and never reach the
    /// evaluator.
    pub async fn evaluate<E: PositionEvaluator>(
        &self,
        evaluator: &mut E,
        board: &Board,
    ) -> Result<Evaluation, EvaluatorError> {
        if let Some(terminal) = Evaluation::terminal(board) {
            return Ok(terminal);
        }

        let fen = format_fen(board);
        let cached = self.entries.read().await.get(&fen).cloned();
        if let Some(evaluation) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%fen, "Evaluation cache hit");
            return Ok(evaluation);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let request = EvaluationRequest::new(fen);
        let evaluation = Evaluation::from(evaluator.evaluate(&request).await?);

        self.entries
            .write()
            .await
            .entry(request.fen)
            .or_insert_with(|| evaluation.clone());
        Ok(evaluation)
    }

    pub async fn get(&self, fen: &str) -> Option<Evaluation> {
        self.entries.read().await.get(fen).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
