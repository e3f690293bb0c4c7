//! Human-regret review of a finished game.
//!
//! [`Analyzer`] walks the analyzed player's moves once, scoring each against
//! the engine's best move and keeping only the ones a human would regret.

pub mod analyzer;
pub mod cache;
pub mod error;
pub mod evaluation;
pub mod helpers;
pub mod phase;
pub mod punishment;
pub mod punishment_line;
pub mod record;
pub mod severity;
pub mod types;
pub mod win_probability;

pub use analyzer::Analyzer;
pub use cache::EvaluationCache;
pub use error::AnalysisError;
pub use evaluation::{Evaluation, PlayerView};
pub use phase::{classify_phase, GamePhase};
pub use punishment::{detect_punishment, PunishmentSignal};
pub use punishment_line::punishment_line;
pub use record::{parse_record, resolve_player, GameSummary, PlayerOutcome};
pub use severity::{classify, MoveFacts, Rule, Severity, RULES};
pub use types::{GameAnalysisResult, ProblemRecord, PUSHUPS_PER_BLUNDER};
pub use win_probability::{win_probability, MATE_SCORE_CP};
