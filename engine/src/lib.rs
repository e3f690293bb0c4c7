pub mod evaluator;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod stockfish;
pub mod uci;

pub use evaluator::{
    EngineEvaluation, EvaluationRequest, EvaluatorError, PositionEvaluator, SharedEvaluator,
};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEvaluator;
pub use stockfish::{EngineConfig, EngineError, StockfishEngine};
pub use uci::{UciError, UciMessage};

use chess::AnalysisScore;
use cozy_chess::Move;

/// Lines the command writer task turns into UCI text.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Uci,
    SetPosition { fen: String },
    SetOption { name: String, value: Option<String> },
    /// Fixed-depth search; every position gets the same effort.
    Go { depth: u8 },
    IsReady,
    Stop,
    Quit,
}

/// What the reader task forwards from engine stdout.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    Ready,
    /// `None` when the engine reports `bestmove (none)`.
    BestMove(Option<Move>),
    Info(EngineInfo),
}

/// The parts of an `info` line that scoring uses.
#[derive(Debug, Clone, Default)]
pub struct EngineInfo {
    pub depth: Option<u8>,
    pub score: Option<AnalysisScore>,
    /// Lower/upper bound scores come from aspiration re-searches.
    pub bound: bool,
    pub multipv: Option<u8>,
}
