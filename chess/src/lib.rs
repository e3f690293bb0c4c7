pub mod analysis;
pub mod fen;
pub mod notation;
pub mod pgn;
pub mod types;
pub mod uci;

pub use analysis::AnalysisScore;
pub use fen::{format_fen, parse_fen, FenError, STARTING_FEN};
pub use notation::{format_piece, format_square, parse_square};
pub use pgn::{
    format_san, parse_pgn, parse_san, GameResult, PgnError, PgnGame, PgnMove, SanError,
};
pub use types::PieceColor;
pub use uci::{format_uci_move, normalize_engine_move};
