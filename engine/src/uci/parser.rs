use super::UciError;
use crate::EngineInfo;
use chess::notation::parse_square;
use chess::AnalysisScore;
use cozy_chess::{Move, Piece, Square};

/// Incoming message from UCI engine
#[derive(Debug, Clone)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    /// `None` for `bestmove (none)`; any ponder move is ignored.
    BestMove { mv: Option<Move> },
    Info(EngineInfo),
}

/// Parse a UCI message line
pub fn parse_uci_message(line: &str) -> Result<UciMessage, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"uciok") => Ok(UciMessage::UciOk),
        Some(&"readyok") => Ok(UciMessage::ReadyOk),

        Some(&"id") => {
            if tokens.len() < 3 {
                return Err(UciError::MalformedMessage(line.to_string()));
            }
            let name = tokens[1].to_string();
            let value = tokens[2..].join(" ");
            Ok(UciMessage::Id { name, value })
        }

        Some(&"bestmove") => {
            let mv = match tokens.get(1) {
                None => return Err(UciError::MalformedMessage(line.to_string())),
                // Stockfish answers "(none)" for mated/stalemated positions,
                // some engines use "0000".
                Some(&"(none)") | Some(&"0000") => None,
                Some(token) => Some(parse_uci_move(token)?),
            };
            Ok(UciMessage::BestMove { mv })
        }

        Some(&"info") => Ok(UciMessage::Info(parse_info_line(&tokens[1..]))),

        _ => Err(UciError::UnknownMessage(line.to_string())),
    }
}

/// Parse an "info" line. Only what scoring needs is kept; every other
/// field and its value is passed over.
fn parse_info_line(tokens: &[&str]) -> EngineInfo {
    let mut info = EngineInfo::default();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                info.depth = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "multipv" => {
                i += 1;
                info.multipv = tokens.get(i).and_then(|s| s.parse().ok());
            }
            "score" => {
                if let (Some(&kind), Some(value)) = (tokens.get(i + 1), tokens.get(i + 2)) {
                    info.score = match kind {
                        "cp" => value.parse().ok().map(AnalysisScore::Centipawns),
                        "mate" => value.parse().ok().map(AnalysisScore::Mate),
                        _ => None,
                    };
                }
                i += 2;
            }
            "lowerbound" | "upperbound" => info.bound = true,
            // Free text runs to the end of the line.
            "string" => break,
            _ => {}
        }
        i += 1;
    }

    info
}

/// Parse UCI move format (e2e4, e7e8q)
pub fn parse_uci_move(s: &str) -> Result<Move, UciError> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(UciError::InvalidMove(s.to_string()));
    }

    let from = square(&s[0..2])?;
    let to = square(&s[2..4])?;

    let promotion = match s.get(4..5) {
        None => None,
        Some("q") => Some(Piece::Queen),
        Some("r") => Some(Piece::Rook),
        Some("b") => Some(Piece::Bishop),
        Some("n") => Some(Piece::Knight),
        Some(_) => return Err(UciError::InvalidPromotion(s.to_string())),
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

fn square(s: &str) -> Result<Square, UciError> {
    parse_square(s).ok_or_else(|| UciError::InvalidSquare(s.to_string()))
}
