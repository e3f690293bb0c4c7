//! Engine score type shared by the engine and analysis crates.

use serde::{Deserialize, Serialize};

/// Engine evaluation score.
///
/// Centipawns: positive = side-to-move is better.
/// Mate: positive N = side-to-move mates in N moves,
/// negative N = side-to-move gets mated in N moves,
/// zero = side-to-move is already checkmated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisScore {
    Centipawns(i32),
    Mate(i32),
}

impl AnalysisScore {
    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) => {
                if *m > 0 {
                    format!("+M{}", m)
                } else {
                    format!("-M{}", m.abs())
                }
            }
        }
    }

    /// True when the side to move is the one delivering mate.
    pub fn side_to_move_mates(&self) -> bool {
        matches!(self, Self::Mate(m) if *m > 0)
    }

    /// Number of moves until mate, regardless of who mates.
    pub fn mate_distance(&self) -> Option<u32> {
        match self {
            Self::Mate(m) => Some(m.unsigned_abs()),
            Self::Centipawns(_) => None,
        }
    }
}

impl std::fmt::Display for AnalysisScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(AnalysisScore::Centipawns(125).display(), "+1.25");
        assert_eq!(AnalysisScore::Centipawns(-40).display(), "-0.40");
        assert_eq!(AnalysisScore::Mate(3).display(), "+M3");
        assert_eq!(AnalysisScore::Mate(-2).display(), "-M2");
    }

    #[test]
    fn test_mating_side() {
        assert!(AnalysisScore::Mate(2).side_to_move_mates());
        assert!(!AnalysisScore::Mate(-2).side_to_move_mates());
        assert_eq!(AnalysisScore::Mate(-2).mate_distance(), Some(2));
        assert_eq!(AnalysisScore::Centipawns(80).mate_distance(), None);
    }

    #[test]
    fn test_checkmated_is_not_mating() {
        assert!(!AnalysisScore::Mate(0).side_to_move_mates());
        assert_eq!(AnalysisScore::Mate(0).mate_distance(), Some(0));
    }
}
