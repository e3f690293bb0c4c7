use chess::normalize_engine_move;
use cozy_chess::{BitBoard, Board, Color, Move, Piece, Square};

/// Returns all pieces of `color` that attack the given square.
pub fn attackers_of(board: &Board, sq: Square, color: Color) -> BitBoard {
    let occupied = board.occupied();
    let color_pieces = board.colors(color);

    let mut attackers = BitBoard::EMPTY;

    // A pawn of `color` attacks `sq` if a pawn of the other color on `sq`
    // would attack the pawn's square.
    let pawn_attacks = cozy_chess::get_pawn_attacks(sq, !color);
    attackers |= pawn_attacks & board.pieces(Piece::Pawn) & color_pieces;

    let knight_attacks = cozy_chess::get_knight_moves(sq);
    attackers |= knight_attacks & board.pieces(Piece::Knight) & color_pieces;

    // Bishop/Queen (diagonal)
    let bishop_attacks = cozy_chess::get_bishop_moves(sq, occupied);
    attackers |=
        bishop_attacks & (board.pieces(Piece::Bishop) | board.pieces(Piece::Queen)) & color_pieces;

    // Rook/Queen (orthogonal)
    let rook_attacks = cozy_chess::get_rook_moves(sq, occupied);
    attackers |=
        rook_attacks & (board.pieces(Piece::Rook) | board.pieces(Piece::Queen)) & color_pieces;

    let king_attacks = cozy_chess::get_king_moves(sq);
    attackers |= king_attacks & board.pieces(Piece::King) & color_pieces;

    attackers
}

/// Knights, bishops, rooks and queens of both colors.
pub fn minor_and_major_piece_count(board: &Board) -> u32 {
    [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .into_iter()
        .map(|piece| board.pieces(piece).len())
        .sum()
}

/// Turn an engine's UCI move into a legal move on `board`.
///
/// Returns `None` when the text does not parse or the move is illegal here.
pub fn resolve_engine_move(board: &Board, uci: &str) -> Option<Move> {
    let mv = engine::uci::parse_uci_move(uci).ok()?;
    let mv = normalize_engine_move(board, mv);
    board.is_legal(mv).then_some(mv)
}
