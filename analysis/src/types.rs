use serde::{Deserialize, Serialize};

use crate::phase::GamePhase;
use crate::record::GameSummary;
use crate::severity::Severity;

/// Push-ups owed per blunder.
pub const PUSHUPS_PER_BLUNDER: usize = 10;

/// One flagged move of the analyzed player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub move_number: u32,
    /// Move played, in SAN.
    pub played: String,
    /// Engine's preferred move in SAN, if it named one.
    pub best_move: Option<String>,
    pub severity: Severity,
    /// Win-probability points lost, to one decimal.
    pub regret: f64,
    pub eval_before: String,
    pub eval_after: String,
    pub hanging_piece: bool,
    pub mate_threat: Option<u32>,
    pub forced_loss: bool,
    pub punishment_line: Option<String>,
    pub game_phase: GamePhase,
}

/// Everything one analysis run reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalysisResult {
    #[serde(flatten)]
    pub summary: GameSummary,
    pub total_problems: usize,
    pub blunders: usize,
    pub mistakes: usize,
    pub inaccuracies: usize,
    pub pushups: usize,
    pub problems: Vec<ProblemRecord>,
}

impl GameAnalysisResult {
    pub fn new(summary: GameSummary, problems: Vec<ProblemRecord>) -> Self {
        let count = |severity| problems.iter().filter(|p| p.severity == severity).count();
        let blunders = count(Severity::Blunder);
        let mistakes = count(Severity::Mistake);
        let inaccuracies = count(Severity::Inaccuracy);

        Self {
            summary,
            total_problems: problems.len(),
            blunders,
            mistakes,
            inaccuracies,
            pushups: blunders * PUSHUPS_PER_BLUNDER,
            problems,
        }
    }
}
