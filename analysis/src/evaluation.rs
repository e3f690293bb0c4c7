use chess::AnalysisScore;
use cozy_chess::{Board, Color};
use engine::EngineEvaluation;

use crate::win_probability::{win_probability, MATE_SCORE_CP};

/// Evaluation of one position from the side to move's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: AnalysisScore,
    /// Best move in UCI notation.
    pub best_move: Option<String>,
    pub win_probability: f64,
}

impl Evaluation {
    pub fn new(score: AnalysisScore, best_move: Option<String>) -> Self {
        Self {
            win_probability: win_probability(score_to_cp(score)),
            score,
            best_move,
        }
    }

    /// Evaluation of a position without legal moves, `None` while play goes on.
    ///
    /// Checkmate is `Mate(0)` for the side to move, stalemate is dead even.
    pub fn terminal(board: &Board) -> Option<Self> {
        let has_moves = board.generate_moves(|_| true);
        if has_moves {
            return None;
        }
        let score = if board.checkers().is_empty() {
            AnalysisScore::Centipawns(0)
        } else {
            AnalysisScore::Mate(0)
        };
        Some(Self::new(score, None))
    }

    /// Re-orient to `player`, given who was to move in the evaluated position.
    pub fn for_player(&self, side_to_move: Color, player: Color) -> PlayerView {
        let cp = score_to_cp(self.score);
        let cp = if side_to_move == player {
            cp
        } else {
            cp.saturating_neg()
        };
        PlayerView {
            cp,
            win_probability: win_probability(cp),
            mate_in: self.score.mate_distance(),
        }
    }
}

impl From<EngineEvaluation> for Evaluation {
    fn from(eval: EngineEvaluation) -> Self {
        Self::new(eval.score, eval.best_move)
    }
}

/// Centipawns, with a forced mate pinned to the mating side's extreme.
pub fn score_to_cp(score: AnalysisScore) -> i32 {
    match score {
        AnalysisScore::Centipawns(cp) => cp,
        AnalysisScore::Mate(_) if score.side_to_move_mates() => MATE_SCORE_CP,
        AnalysisScore::Mate(_) => -MATE_SCORE_CP,
    }
}

/// An evaluation seen from the analyzed player's side of the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub cp: i32,
    pub win_probability: f64,
    pub mate_in: Option<u32>,
}

impl PlayerView {
    /// `+1.25`, `-0.40`, `#3` when the player mates, `-#3` when mated.
    pub fn format(&self) -> String {
        match self.mate_in {
            Some(n) if self.cp > 0 => format!("#{}", n),
            Some(n) => format!("-#{}", n),
            None => {
                let sign = if self.cp >= 0 { '+' } else { '-' };
                format!("{}{:.2}", sign, f64::from(self.cp.unsigned_abs()) / 100.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    #[test]
    fn test_player_view_flips_for_opponent_to_move() {
        let eval = Evaluation::new(AnalysisScore::Centipawns(150), Some("e2e4".into()));
        let same = eval.for_player(Color::White, Color::White);
        let flipped = eval.for_player(Color::Black, Color::White);
        assert_eq!(same.cp, 150);
        assert_eq!(flipped.cp, -150);
        assert!((same.win_probability + flipped.win_probability - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_mate_saturates_to_mating_side() {
        let mating = Evaluation::new(AnalysisScore::Mate(3), None);
        assert_eq!(mating.for_player(Color::White, Color::White).cp, MATE_SCORE_CP);
        assert_eq!(mating.for_player(Color::White, Color::Black).cp, -MATE_SCORE_CP);

        let mated = Evaluation::new(AnalysisScore::Mate(-2), None);
        assert_eq!(mated.for_player(Color::Black, Color::Black).cp, -MATE_SCORE_CP);
        assert!(mated.win_probability < 0.01);
    }

    #[test]
    fn test_format() {
        let view = |cp, mate_in| PlayerView {
            cp,
            win_probability: win_probability(cp),
            mate_in,
        };
        assert_eq!(view(125, None).format(), "+1.25");
        assert_eq!(view(-40, None).format(), "-0.40");
        assert_eq!(view(0, None).format(), "+0.00");
        assert_eq!(view(MATE_SCORE_CP, Some(3)).format(), "#3");
        assert_eq!(view(-MATE_SCORE_CP, Some(3)).format(), "-#3");
    }

    #[test]
    fn test_terminal_checkmate() {
        // Fool's mate, white to move and mated.
        let mated = board("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let eval = Evaluation::terminal(&mated).unwrap();
        assert_eq!(eval.score, AnalysisScore::Mate(0));
        assert!(eval.best_move.is_none());
        // The side that delivered mate sees it as a won game.
        assert_eq!(eval.for_player(Color::White, Color::Black).cp, MATE_SCORE_CP);
    }

    #[test]
    fn test_terminal_stalemate() {
        let stalemate = board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let eval = Evaluation::terminal(&stalemate).unwrap();
        assert_eq!(eval.score, AnalysisScore::Centipawns(0));
        assert!((eval.win_probability - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_ongoing_is_not_terminal() {
        assert!(Evaluation::terminal(&Board::default()).is_none());
    }
}
