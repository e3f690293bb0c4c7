pub mod parser;
pub mod san;

pub use parser::{parse_pgn, GameResult, PgnError, PgnGame, PgnMove};
pub use san::{format_san, parse_san, SanError};
