use cozy_chess::{Board, GameStatus, Move, Piece, Square};

use crate::notation::{
    file_char, format_square, parse_file, parse_piece_letter, parse_rank, parse_square,
    piece_letter, rank_char,
};

/// Parse Standard Algebraic Notation (SAN) move against the given position.
///
/// Check/mate markers and annotation glyphs (`+`, `#`, `!`, `?`) are optional.
/// Castling is accepted as `O-O`/`O-O-O` or with zeros.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let token = strip_suffixes(san.trim());
    if token.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    if let Some(kingside) = castling_side(token) {
        return find_castle(board, kingside).ok_or_else(|| SanError::NoLegalMove(san.to_string()));
    }

    let spec = SanSpec::parse(token)?;

    let mut candidates = Vec::new();
    let ours = board.pieces(spec.piece) & board.colors(board.side_to_move());
    board.generate_moves_for(ours, |moves| {
        for mv in moves {
            if spec.matches(board, mv) {
                candidates.push(mv);
            }
        }
        false
    });

    match candidates.as_slice() {
        [] => Err(SanError::NoLegalMove(san.to_string())),
        [mv] => Ok(*mv),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Format a legal move as SAN, including the check or mate marker.
///
/// Falls back to UCI when there is no piece on the origin square.
pub fn format_san(board: &Board, mv: Move) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return crate::uci::format_uci_move(mv);
    };

    let mut san = if is_castle(board, mv) {
        if (mv.to.file() as u8) > (mv.from.file() as u8) {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else {
        format_regular(board, mv, piece)
    };

    if board.is_legal(mv) {
        let mut after = board.clone();
        after.play_unchecked(mv);
        if after.status() == GameStatus::Won {
            san.push('#');
        } else if !after.checkers().is_empty() {
            san.push('+');
        }
    }

    san
}

fn format_regular(board: &Board, mv: Move, piece: Piece) -> String {
    let mut san = String::new();
    let is_capture = board.colors(!board.side_to_move()).has(mv.to)
        || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_char(mv.from.file()));
        }
    } else {
        san.push(piece_letter(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }

    if is_capture {
        san.push('x');
    }

    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        san.push(piece_letter(promo));
    }

    san
}

/// Origin file and/or rank needed to tell `mv` apart from sibling moves.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let mut rivals: Vec<Square> = Vec::new();
    let ours = board.pieces(piece) & board.colors(board.side_to_move());
    board.generate_moves_for(ours, |moves| {
        for other in moves {
            if other.to == mv.to && other.from != mv.from && !rivals.contains(&other.from) {
                rivals.push(other.from);
            }
        }
        false
    });

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != mv.from.file()) {
        file_char(mv.from.file()).to_string()
    } else if rivals.iter().all(|sq| sq.rank() != mv.from.rank()) {
        rank_char(mv.from.rank()).to_string()
    } else {
        format_square(mv.from)
    }
}

/// The board encodes castling as the king capturing its own rook.
fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.colors(board.side_to_move()).has(mv.to)
}

fn find_castle(board: &Board, kingside: bool) -> Option<Move> {
    let mut found = None;
    let king = board.pieces(Piece::King) & board.colors(board.side_to_move());
    board.generate_moves_for(king, |moves| {
        for mv in moves {
            let goes_right = (mv.to.file() as u8) > (mv.from.file() as u8);
            if is_castle(board, mv) && goes_right == kingside {
                found = Some(mv);
                return true;
            }
        }
        false
    });
    found
}

fn castling_side(token: &str) -> Option<bool> {
    match token {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    }
}

fn strip_suffixes(token: &str) -> &str {
    token.trim_end_matches(['+', '#', '!', '?'])
}

/// The constraints a SAN token places on a move.
struct SanSpec {
    piece: Piece,
    to: Square,
    from_file: Option<cozy_chess::File>,
    from_rank: Option<cozy_chess::Rank>,
    promotion: Option<Piece>,
}

impl SanSpec {
    fn parse(token: &str) -> Result<Self, SanError> {
        let mut chars: Vec<char> = token
            .chars()
            .filter(|c| !matches!(c, 'x' | ':' | '-'))
            .collect();

        let piece = match chars.first() {
            Some(c) if c.is_ascii_uppercase() => {
                let piece = parse_piece_letter(*c)
                    .filter(|p| *p != Piece::Pawn)
                    .ok_or_else(|| SanError::InvalidFormat(token.to_string()))?;
                chars.remove(0);
                piece
            }
            _ => Piece::Pawn,
        };

        let mut promotion = None;
        if piece == Piece::Pawn {
            // The destination always ends in a rank digit, so a trailing letter
            // can only be a promotion piece.
            if let Some(last) = chars.last().copied().filter(|c| c.is_ascii_alphabetic()) {
                let piece = parse_piece_letter(last)
                    .filter(|p| !matches!(p, Piece::Pawn | Piece::King))
                    .ok_or_else(|| SanError::InvalidPromotion(token.to_string()))?;
                promotion = Some(piece);
                chars.pop();
            }
            if chars.last() == Some(&'=') {
                chars.pop();
            }
        }

        if chars.len() < 2 || chars.len() > 4 {
            return Err(SanError::InvalidFormat(token.to_string()));
        }

        let dest: String = chars[chars.len() - 2..].iter().collect();
        let to = parse_square(&dest).ok_or_else(|| SanError::InvalidSquare(dest.clone()))?;

        let mut from_file = None;
        let mut from_rank = None;
        for c in &chars[..chars.len() - 2] {
            if let Some(file) = parse_file(*c) {
                from_file = Some(file);
            } else if let Some(rank) = parse_rank(*c) {
                from_rank = Some(rank);
            } else {
                return Err(SanError::InvalidFormat(token.to_string()));
            }
        }

        Ok(Self {
            piece,
            to,
            from_file,
            from_rank,
            promotion,
        })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        mv.to == self.to
            && !is_castle(board, mv)
            && mv.promotion == self.promotion
            && self.from_file.map_or(true, |f| mv.from.file() == f)
            && self.from_rank.map_or(true, |r| mv.from.rank() == r)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn board(fen: &str) -> Board {
        fen.parse().expect("valid fen")
    }

    fn mv(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    #[test]
    fn test_format_pawn_push() {
        assert_eq!(format_san(&board(START_FEN), mv(Square::E2, Square::E4)), "e4");
    }

    #[test]
    fn test_format_knight() {
        assert_eq!(format_san(&board(START_FEN), mv(Square::G1, Square::F3)), "Nf3");
    }

    #[test]
    fn test_format_capture() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        assert_eq!(format_san(&b, mv(Square::E4, Square::D5)), "exd5");
    }

    #[test]
    fn test_format_en_passant() {
        let b = board("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert_eq!(format_san(&b, mv(Square::E5, Square::F6)), "exf6");
    }

    #[test]
    fn test_format_castling() {
        let b = board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(format_san(&b, mv(Square::E1, Square::H1)), "O-O");
        assert_eq!(format_san(&b, mv(Square::E1, Square::A1)), "O-O-O");
    }

    #[test]
    fn test_format_promotion() {
        let b = board("8/P7/8/8/8/8/7k/4K3 w - - 0 1");
        let promo = Move {
            from: Square::A7,
            to: Square::A8,
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_san(&b, promo), "a8=Q");
    }

    #[test]
    fn test_format_mate_and_check() {
        let b = board("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2");
        assert_eq!(format_san(&b, mv(Square::D8, Square::H4)), "Qh4#");

        let b = board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        assert_eq!(format_san(&b, mv(Square::A1, Square::A8)), "Ra8+");
    }

    #[test]
    fn test_format_disambiguation() {
        let b = board("rnbqkbnr/pppppppp/8/8/8/5N2/PPP1PPPP/RNBQKB1R w KQkq - 0 1");
        assert_eq!(format_san(&b, mv(Square::B1, Square::D2)), "Nbd2");

        let b = board("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        assert_eq!(format_san(&b, mv(Square::A1, Square::A3)), "R1a3");
    }

    #[test]
    fn test_parse_basic_moves() {
        let b = board(START_FEN);
        assert_eq!(parse_san(&b, "e4").unwrap(), mv(Square::E2, Square::E4));
        assert_eq!(parse_san(&b, "Nf3").unwrap(), mv(Square::G1, Square::F3));
        assert_eq!(parse_san(&b, "Nf3!?").unwrap(), mv(Square::G1, Square::F3));
    }

    #[test]
    fn test_parse_castling_variants() {
        let b = board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(parse_san(&b, "O-O").unwrap(), mv(Square::E1, Square::H1));
        assert_eq!(parse_san(&b, "0-0-0").unwrap(), mv(Square::E1, Square::A1));
    }

    #[test]
    fn test_parse_promotion_and_capture() {
        let b = board("1r5k/P7/8/8/8/8/8/4K3 w - - 0 1");
        let parsed = parse_san(&b, "axb8=N").unwrap();
        assert_eq!(parsed.to, Square::B8);
        assert_eq!(parsed.promotion, Some(Piece::Knight));

        let parsed = parse_san(&b, "a8Q").unwrap();
        assert_eq!(parsed.promotion, Some(Piece::Queen));
    }

    #[test]
    fn test_parse_ambiguous_and_illegal() {
        let b = board("rnbqkbnr/pppppppp/8/8/8/5N2/PPP1PPPP/RNBQKB1R w KQkq - 0 1");
        assert!(matches!(parse_san(&b, "Nd2"), Err(SanError::AmbiguousMove(_))));
        assert!(parse_san(&b, "Nbd2").is_ok());
        assert!(matches!(parse_san(&b, "Qh5"), Err(SanError::NoLegalMove(_))));
        assert!(matches!(parse_san(&b, "Zz9"), Err(SanError::InvalidFormat(_))));
    }
}
