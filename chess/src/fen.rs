use cozy_chess::Board;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = fen.trim();
    if fen.split_whitespace().count() < 4 {
        return Err(FenError::InvalidFormat(fen.to_string()));
    }

    Board::from_fen(fen, false).map_err(|_| FenError::InvalidBoardLayout(fen.to_string()))
}

/// Format a Board as a FEN string.
///
/// This is the canonical identity of a position throughout the workspace.
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format: {0}")]
    InvalidFormat(String),
    #[error("Invalid board layout: {0}")]
    InvalidBoardLayout(String),
}
