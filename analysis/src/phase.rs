use cozy_chess::Board;
use serde::{Deserialize, Serialize};

use crate::helpers::minor_and_major_piece_count;

/// Moves up to and including this one count as the opening.
pub const OPENING_LAST_MOVE: u32 = 10;

/// At most this many knights, bishops, rooks and queens left means endgame.
pub const ENDGAME_MAX_PIECES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// Phase of the game for a move, judged on the position after it.
pub fn classify_phase(move_number: u32, after: &Board) -> GamePhase {
    if move_number <= OPENING_LAST_MOVE {
        GamePhase::Opening
    } else if minor_and_major_piece_count(after) <= ENDGAME_MAX_PIECES {
        GamePhase::Endgame
    } else {
        GamePhase::Middlegame
    }
}
