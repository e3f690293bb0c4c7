//! Scripted evaluator for tests - only compiled in test mode or with the mock feature

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chess::AnalysisScore;

use crate::evaluator::{EngineEvaluation, EvaluationRequest, EvaluatorError, PositionEvaluator};

/// Answers evaluation requests from a table keyed by FEN.
///
/// Clones share the script and the call log, so a test can hand one clone to
/// the code under test and inspect the calls through another.
#[derive(Debug, Clone, Default)]
pub struct MockEvaluator {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, EngineEvaluation>,
    fallback: Option<EngineEvaluation>,
    failure: Option<EvaluatorError>,
    call_log: Vec<String>,
}

impl MockEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answer for one position.
    pub fn with_response(self, fen: &str, score: AnalysisScore, best_move: Option<&str>) -> Self {
        self.lock().responses.insert(
            fen.to_string(),
            EngineEvaluation {
                score,
                best_move: best_move.map(str::to_string),
            },
        );
        self
    }

    /// Answer used for positions without a scripted response.
    pub fn with_fallback(self, score: AnalysisScore, best_move: Option<&str>) -> Self {
        self.lock().fallback = Some(EngineEvaluation {
            score,
            best_move: best_move.map(str::to_string),
        });
        self
    }

    /// Fail every request with `error`.
    pub fn with_failure(self, error: EvaluatorError) -> Self {
        self.lock().failure = Some(error);
        self
    }

    /// FENs of all requests received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().call_log.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().call_log.clear()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PositionEvaluator for MockEvaluator {
    async fn evaluate(
        &mut self,
        request: &EvaluationRequest,
    ) -> Result<EngineEvaluation, EvaluatorError> {
        let mut state = self.lock();
        state.call_log.push(request.fen.clone());

        if let Some(error) = &state.failure {
            return Err(error.clone());
        }

        state
            .responses
            .get(&request.fen)
            .or(state.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                EvaluatorError::Unavailable(format!("no scripted evaluation for {}", request.fen))
            })
    }
}
