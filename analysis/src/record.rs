//! Game record intake: parse the PGN, find the analyzed player, and collect
//! the header facts reported next to the problems.

use std::sync::OnceLock;

use chess::{parse_pgn, GameResult, PgnGame, PieceColor};
use cozy_chess::Color;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Result of the game for the analyzed player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerOutcome {
    Win,
    Loss,
    Draw,
}

/// Header facts about one game, seen from the analyzed player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Site URL without its query string.
    pub game_link: Option<String>,
    pub player: String,
    pub opponent: String,
    pub player_color: PieceColor,
    /// TimeControl tag, or "unknown".
    pub game_mode: String,
    pub outcome: Option<PlayerOutcome>,
    /// UTC start as `YYYY-MM-DDTHH:MM:SS`, or just the date.
    pub played_at: Option<String>,
}

impl GameSummary {
    pub fn from_game(game: &PgnGame, player: Color) -> Self {
        let (player_tag, opponent_tag) = match player {
            Color::White => ("White", "Black"),
            Color::Black => ("Black", "White"),
        };

        Self {
            game_link: game
                .tag("Site")
                .and_then(|site| site.split('?').next())
                .map(str::to_string),
            player: game.tag(player_tag).unwrap_or_default().to_string(),
            opponent: game.tag(opponent_tag).unwrap_or_default().to_string(),
            player_color: PieceColor::from(player),
            game_mode: game.tag("TimeControl").unwrap_or("unknown").to_string(),
            outcome: outcome_for(game.result, player),
            played_at: played_at(game),
        }
    }
}

/// Parse a PGN into a replayed game.
pub fn parse_record(pgn: &str) -> Result<PgnGame, AnalysisError> {
    let game = parse_pgn(pgn)?;
    if game.moves.is_empty() && game.tag("White").is_none() && game.tag("Black").is_none() {
        return Err(AnalysisError::InvalidRecord("no players and no moves".to_string()));
    }
    Ok(game)
}

/// Which side `username` played, compared case-insensitively.
pub fn resolve_player(game: &PgnGame, username: &str) -> Result<Color, AnalysisError> {
    let wanted = username.trim().to_lowercase();
    let matches = |tag: &str| {
        game.tag(tag)
            .is_some_and(|name| !wanted.is_empty() && name.to_lowercase() == wanted)
    };

    if matches("White") {
        Ok(Color::White)
    } else if matches("Black") {
        Ok(Color::Black)
    } else {
        Err(AnalysisError::PlayerNotFound {
            username: username.to_string(),
        })
    }
}

fn outcome_for(result: GameResult, player: Color) -> Option<PlayerOutcome> {
    match (result, player) {
        (GameResult::WhiteWins, Color::White) | (GameResult::BlackWins, Color::Black) => {
            Some(PlayerOutcome::Win)
        }
        (GameResult::WhiteWins, Color::Black) | (GameResult::BlackWins, Color::White) => {
            Some(PlayerOutcome::Loss)
        }
        (GameResult::Draw, _) => Some(PlayerOutcome::Draw),
        (GameResult::Ongoing, _) => None,
    }
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})\.(\d{2})\.(\d{2})$").expect("date pattern is a valid regex")
    })
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2}):(\d{2}):(\d{2})$").expect("time pattern is a valid regex")
    })
}

/// `UTCDate`/`UTCTime`, falling back to `Date`/`Time`. Unknown parts such as
/// `????.??.??` yield `None`.
fn played_at(game: &PgnGame) -> Option<String> {
    let date = game.tag("UTCDate").or_else(|| game.tag("Date"))?;
    let caps = date_pattern().captures(date)?;
    let date = format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);

    let time = game
        .tag("UTCTime")
        .or_else(|| game.tag("Time"))
        .filter(|t| time_pattern().is_match(t));
    Some(match time {
        Some(time) => format!("{}T{}", date, time),
        None => date,
    })
}
