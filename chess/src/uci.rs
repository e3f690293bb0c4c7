//! Move spelling for the engine protocol.

use cozy_chess::{Board, File, Move, Piece, Square};

use crate::notation::{format_piece, format_square};

/// Format a move in UCI notation ("e2e4", "e7e8q").
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

/// Translate an engine move into the board's own encoding.
///
/// Engines castle by moving the king two files (`e1g1`); the board wants the
/// king to take its own rook (`e1h1`). Anything that is not such a king move,
/// or whose rewritten form is illegal, comes back unchanged.
pub fn normalize_engine_move(board: &Board, mv: Move) -> Move {
    let king_hop = board.piece_on(mv.from) == Some(Piece::King)
        && mv.from.file() == File::E
        && matches!(mv.to.file(), File::G | File::C)
        && mv.from.rank() == mv.to.rank();
    if !king_hop {
        return mv;
    }

    let rook_file = if mv.to.file() == File::G { File::H } else { File::A };
    let castle = Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };
    if board.is_legal(castle) {
        castle
    } else {
        mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::Rank;

    #[test]
    fn test_normalize_engine_castling() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let mv = Move {
            from: Square::E1,
            to: Square::G1,
            promotion: None,
        };
        let normalized = normalize_engine_move(&board, mv);
        assert_eq!(normalized.to, Square::H1);
        assert!(board.is_legal(normalized));
    }

    #[test]
    fn test_normalize_black_queenside() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1".parse().unwrap();
        let mv = Move {
            from: Square::E8,
            to: Square::C8,
            promotion: None,
        };
        assert_eq!(normalize_engine_move(&board, mv).to, Square::A8);
    }

    #[test]
    fn test_normalize_without_castling_rights() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K2R w - - 0 1".parse().unwrap();
        let mv = Move {
            from: Square::E1,
            to: Square::G1,
            promotion: None,
        };
        assert_eq!(normalize_engine_move(&board, mv), mv);
    }

    #[test]
    fn test_normalize_leaves_ordinary_moves() {
        let board = Board::default();
        let mv = Move {
            from: Square::E2,
            to: Square::E4,
            promotion: None,
        };
        assert_eq!(normalize_engine_move(&board, mv), mv);
    }

    #[test]
    fn test_format_uci_move() {
        let mv = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(format_uci_move(mv), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let mv = Move {
            from: Square::new(File::E, Rank::Seventh),
            to: Square::new(File::E, Rank::Eighth),
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_uci_move(mv), "e7e8q");
    }
}
