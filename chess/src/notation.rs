//! Square and piece spellings shared by the UCI and SAN codecs.

use cozy_chess::{File, Piece, Rank, Square};

/// Format a square in algebraic form ("e4").
pub fn format_square(sq: Square) -> String {
    format!("{}{}", file_char(sq.file()), rank_char(sq.rank()))
}

/// Lowercase piece letter as used in UCI promotions ("q", "n", ...).
pub fn format_piece(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// Uppercase piece letter as used in SAN ("N", "Q", ...).
pub fn piece_letter(piece: Piece) -> char {
    format_piece(piece).to_ascii_uppercase()
}

/// Piece for a letter in either case.
pub fn parse_piece_letter(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'p' => Some(Piece::Pawn),
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        'k' => Some(Piece::King),
        _ => None,
    }
}

/// Parse an algebraic square ("e4"). Returns `None` for anything else.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = chars.next().and_then(parse_file)?;
    let rank = chars.next().and_then(parse_rank)?;
    if chars.next().is_some() {
        return None;
    }
    Some(Square::new(file, rank))
}

pub fn file_char(file: File) -> char {
    (b'a' + file as u8) as char
}

pub fn rank_char(rank: Rank) -> char {
    (b'1' + rank as u8) as char
}

pub fn parse_file(c: char) -> Option<File> {
    match c {
        'a'..='h' => File::try_index(c as usize - 'a' as usize),
        _ => None,
    }
}

pub fn parse_rank(c: char) -> Option<Rank> {
    match c {
        '1'..='8' => Rank::try_index(c as usize - '1' as usize),
        _ => None,
    }
}
