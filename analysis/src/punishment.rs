//! Tactical punishment: can the opponent obviously exploit the move just played?
//!
//! All checks run on the position after the candidate move, so the engine
//! score handed in is from the opponent's (side to move's) point of view.

use chess::AnalysisScore;
use cozy_chess::{Board, Color, Piece, Square};
use serde::{Deserialize, Serialize};

use crate::helpers::attackers_of;

/// Longest forced mate still counted as an obvious threat.
pub const MATE_THREAT_HORIZON: i32 = 5;

/// Opponent advantage above which material is considered lost by force.
pub const FORCED_LOSS_THRESHOLD_CP: i32 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunishmentSignal {
    pub hanging_piece: bool,
    pub mate_threat_in: Option<u32>,
    pub forced_material_loss: bool,
    pub is_obvious: bool,
}

impl PunishmentSignal {
    pub fn new(
        hanging_piece: bool,
        mate_threat_in: Option<u32>,
        forced_material_loss: bool,
    ) -> Self {
        Self {
            hanging_piece,
            mate_threat_in,
            forced_material_loss,
            is_obvious: hanging_piece || mate_threat_in.is_some() || forced_material_loss,
        }
    }
}

/// Inspect the position after `player` moved.
///
/// `post_score` is the engine score of `after`, side to move (the opponent)
/// perspective.
pub fn detect_punishment(
    after: &Board,
    player: Color,
    post_score: AnalysisScore,
) -> PunishmentSignal {
    let hanging = hanging_piece(after, player);
    if let Some((piece, sq)) = hanging {
        tracing::trace!(?piece, ?sq, "Hanging piece after move");
    }

    let (mate_threat_in, forced_material_loss) = match post_score {
        AnalysisScore::Mate(n) if (1..=MATE_THREAT_HORIZON).contains(&n) => {
            (Some(n.unsigned_abs()), false)
        }
        AnalysisScore::Mate(_) => (None, false),
        AnalysisScore::Centipawns(cp) => (None, cp > FORCED_LOSS_THRESHOLD_CP),
    };

    PunishmentSignal::new(hanging.is_some(), mate_threat_in, forced_material_loss)
}

/// First piece of `player` that the opponent attacks and nobody defends.
///
/// Pawns are part of the scan but a loose pawn is not worth flagging, so
/// only knights, bishops, rooks and queens are reported.
pub fn hanging_piece(board: &Board, player: Color) -> Option<(Piece, Square)> {
    let opponent = !player;
    let candidates = board.colors(player) & !board.pieces(Piece::King);

    candidates
        .into_iter()
        .filter(|&sq| {
            !attackers_of(board, sq, opponent).is_empty()
                && attackers_of(board, sq, player).is_empty()
        })
        .filter_map(|sq| board.piece_on(sq).map(|piece| (piece, sq)))
        .find(|&(piece, _)| piece != Piece::Pawn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    #[test]
    fn test_undefended_queen_is_hanging() {
        // White queen on d5 attacked by the e6 pawn, nothing defends it.
        let b = board("4k3/8/4p3/3Q4/8/8/8/4K3 b - - 0 1");
        assert_eq!(hanging_piece(&b, Color::White), Some((Piece::Queen, Square::D5)));

        let signal = detect_punishment(&b, Color::White, AnalysisScore::Centipawns(800));
        assert!(signal.hanging_piece);
        assert!(signal.forced_material_loss);
        assert!(signal.is_obvious);
    }

    #[test]
    fn test_defended_piece_is_not_hanging() {
        // Same queen, now covered by the rook on d1.
        let b = board("4k3/8/4p3/3Q4/8/8/8/3RK3 b - - 0 1");
        assert_eq!(hanging_piece(&b, Color::White), None);
    }

    #[test]
    fn test_hanging_pawn_alone_never_flags() {
        // White pawn on d5 attacked by the c6 pawn and undefended.
        let b = board("4k3/8/2p5/3P4/8/8/8/4K3 b - - 0 1");
        assert_eq!(hanging_piece(&b, Color::White), None);
        let signal = detect_punishment(&b, Color::White, AnalysisScore::Centipawns(0));
        assert_eq!(signal, PunishmentSignal::default());
    }

    #[test]
    fn test_pawn_does_not_shadow_later_hanging_piece() {
        // Loose pawn on b2 (scanned first) and loose rook on h5 are both attacked.
        let b = board("4k3/8/6p1/7R/n7/8/1P6/4K3 w - - 0 1");
        assert_eq!(hanging_piece(&b, Color::White).map(|(p, _)| p), Some(Piece::Rook));
    }

    #[test]
    fn test_mate_threat_horizon() {
        let b = Board::default();
        let near = detect_punishment(&b, Color::White, AnalysisScore::Mate(5));
        assert_eq!(near.mate_threat_in, Some(5));
        assert!(near.is_obvious);
        assert!(!near.forced_material_loss);

        let far = detect_punishment(&b, Color::White, AnalysisScore::Mate(6));
        assert_eq!(far.mate_threat_in, None);
        assert!(!far.is_obvious);

        // The opponent being mated is no threat to the player.
        let mated = detect_punishment(&b, Color::White, AnalysisScore::Mate(-2));
        assert_eq!(mated.mate_threat_in, None);
    }

    #[test]
    fn test_forced_loss_uses_opponent_perspective() {
        let b = Board::default();
        let opponent_up = detect_punishment(&b, Color::White, AnalysisScore::Centipawns(301));
        assert!(opponent_up.forced_material_loss);
        assert!(opponent_up.is_obvious);

        let opponent_down = detect_punishment(&b, Color::White, AnalysisScore::Centipawns(-301));
        assert!(!opponent_down.forced_material_loss);

        let boundary = detect_punishment(&b, Color::White, AnalysisScore::Centipawns(300));
        assert!(!boundary.forced_material_loss);
    }
}
