use std::collections::HashMap;
use std::sync::OnceLock;

use cozy_chess::{Board, Move};
use regex::Regex;

use super::san::{format_san, parse_san, SanError};
use crate::fen::{parse_fen, FenError};

/// A parsed PGN game
#[derive(Debug, Clone)]
pub struct PgnGame {
    pub tags: HashMap<String, String>,
    /// Position before the first move (standard start or the `FEN` tag).
    pub start: Board,
    pub moves: Vec<PgnMove>,
    pub result: GameResult,
}

/// One ply of the main line, with the positions around it.
#[derive(Debug, Clone)]
pub struct PgnMove {
    pub before: Board,
    pub mv: Move,
    /// Canonical SAN, regenerated from the position.
    pub san: String,
    pub after: Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl GameResult {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" => Some(Self::Draw),
            "*" => Some(Self::Ongoing),
            _ => None,
        }
    }
}

impl PgnGame {
    /// Non-empty tag value.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Parse the first game of a PGN string.
pub fn parse_pgn(input: &str) -> Result<PgnGame, PgnError> {
    let (tags, movetext) = split_sections(input)?;

    if tags.is_empty() && movetext.trim().is_empty() {
        return Err(PgnError::InvalidFormat("no tags or moves".to_string()));
    }

    let start = match tags.get("FEN") {
        Some(fen) => parse_fen(fen)?,
        None => Board::default(),
    };

    let mut result = tags
        .get("Result")
        .and_then(|r| GameResult::from_token(r.trim()));

    let mut board = start.clone();
    let mut moves: Vec<PgnMove> = Vec::new();

    for token in tokenize(&movetext)? {
        match token {
            Token::Move(text) => {
                let mv = parse_san(&board, &text).map_err(|source| PgnError::IllegalMove {
                    ply: moves.len() + 1,
                    san: text.clone(),
                    source,
                })?;
                let san = format_san(&board, mv);
                let before = board.clone();
                board.play_unchecked(mv);
                moves.push(PgnMove {
                    before,
                    mv,
                    san,
                    after: board.clone(),
                });
            }
            Token::Result(token_result) => {
                result.get_or_insert(token_result);
                break;
            }
        }
    }

    Ok(PgnGame {
        tags,
        start,
        moves,
        result: result.unwrap_or(GameResult::Ongoing),
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\[\s*([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\s*\]$"#)
            .expect("tag pattern is a valid regex")
    })
}

/// Tracks whether movetext ends a line inside a `{}` comment or a variation,
/// where a leading `[` is comment text rather than the next game's tags.
#[derive(Debug, Default)]
struct OpenSpans {
    in_comment: bool,
    variation_depth: usize,
}

impl OpenSpans {
    fn feed(&mut self, line: &str) {
        for ch in line.chars() {
            match ch {
                '}' if self.in_comment => self.in_comment = false,
                _ if self.in_comment => {}
                '{' => self.in_comment = true,
                // Rest-of-line comment.
                ';' => break,
                '(' => self.variation_depth += 1,
                ')' => self.variation_depth = self.variation_depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    fn is_open(&self) -> bool {
        self.in_comment || self.variation_depth > 0
    }
}

/// Split the tag pairs from the movetext of the first game.
fn split_sections(input: &str) -> Result<(HashMap<String, String>, String), PgnError> {
    let mut tags = HashMap::new();
    let mut movetext = String::new();
    let mut in_movetext = false;
    let mut spans = OpenSpans::default();

    for line in input.lines() {
        let trimmed = line.trim();
        let at_top_level = !spans.is_open();

        if at_top_level && line.starts_with('%') {
            continue;
        }

        if at_top_level && trimmed.starts_with('[') {
            if in_movetext {
                // Start of the next game.
                break;
            }
            let caps = tag_pattern()
                .captures(trimmed)
                .ok_or_else(|| PgnError::InvalidTag(trimmed.to_string()))?;
            let value = caps[2].replace("\\\"", "\"").replace("\\\\", "\\");
            tags.insert(caps[1].to_string(), value);
            continue;
        }

        if !trimmed.is_empty() {
            in_movetext = true;
        }
        if in_movetext {
            spans.feed(line);
            movetext.push_str(line);
            movetext.push('\n');
        }
    }

    Ok((tags, movetext))
}

/// Main-line tokens; comments, NAGs and variations are dropped while
/// tokenizing.
#[derive(Debug, PartialEq)]
enum Token {
    Move(String),
    Result(GameResult),
}

fn tokenize(text: &str) -> Result<Vec<Token>, PgnError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '{' => {
                if !chars.by_ref().any(|ch| ch == '}') {
                    return Err(PgnError::InvalidFormat("unterminated comment".into()));
                }
            }
            ';' => {
                for ch in chars.by_ref() {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            '(' => skip_variation(&mut chars)?,
            ')' => return Err(PgnError::InvalidFormat("unbalanced ')'".into())),
            '$' => {
                let mut digits = String::new();
                while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
                    digits.push(d);
                }
                if digits.parse::<u8>().is_err() {
                    return Err(PgnError::InvalidFormat(format!("bad NAG ${digits}")));
                }
            }
            _ => {
                let mut word = String::from(c);
                while let Some(ch) = chars.next_if(|ch| !is_word_boundary(*ch)) {
                    word.push(ch);
                }
                if let Some(token) = classify_word(&word) {
                    tokens.push(token);
                }
            }
        }
    }

    Ok(tokens)
}

fn is_word_boundary(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '{' | '}' | '(' | ')' | ';' | '$')
}

fn skip_variation(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<(), PgnError> {
    let mut depth = 1usize;
    let mut in_comment = false;
    for ch in chars.by_ref() {
        match ch {
            '{' => in_comment = true,
            '}' => in_comment = false,
            '(' if !in_comment => depth += 1,
            ')' if !in_comment => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
    Err(PgnError::InvalidFormat("unterminated variation".into()))
}

fn classify_word(word: &str) -> Option<Token> {
    if let Some(result) = GameResult::from_token(word) {
        return Some(Token::Result(result));
    }

    let bare = word.trim_end_matches(['+', '#', '!', '?']);
    if matches!(bare, "0-0" | "0-0-0") {
        return Some(Token::Move(word.to_string()));
    }

    // Move numbers, possibly glued to the move ("12.e4", "12...Nf6").
    let rest = if word.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        word.trim_start_matches(|c: char| c.is_ascii_digit())
            .trim_start_matches('.')
    } else {
        word
    };

    if rest.is_empty() || rest.chars().all(|c| matches!(c, '!' | '?')) {
        return None;
    }

    Some(Token::Move(rest.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum PgnError {
    #[error("Invalid PGN format: {0}")]
    InvalidFormat(String),
    #[error("Invalid tag: {0}")]
    InvalidTag(String),
    #[error("Invalid starting position: {0}")]
    InvalidStart(#[from] FenError),
    #[error("Illegal move {san} at ply {ply}: {source}")]
    IllegalMove {
        ply: usize,
        san: String,
        #[source]
        source: SanError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::{Color, Square};

    const SCHOLARS_MATE: &str = r#"[Event "Rated Blitz game"]
[Site "https://lichess.org/abcd1234?ref=home"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]
[TimeControl "300+0"]

1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6?? 4. Qxf7# 1-0
"#;

    #[test]
    fn test_parse_basic_game() {
        let game = parse_pgn(SCHOLARS_MATE).unwrap();
        assert_eq!(game.tag("White"), Some("Alice"));
        assert_eq!(game.tag("TimeControl"), Some("300+0"));
        assert_eq!(game.result, GameResult::WhiteWins);
        assert_eq!(game.moves.len(), 7);
        assert_eq!(game.moves[0].san, "e4");
        assert_eq!(game.moves[6].san, "Qxf7#");
        assert_eq!(game.moves[6].mv.to, Square::F7);
        assert_eq!(game.moves[6].after.status(), cozy_chess::GameStatus::Won);
    }

    #[test]
    fn test_positions_chain() {
        let game = parse_pgn(SCHOLARS_MATE).unwrap();
        assert_eq!(game.moves[0].before.side_to_move(), Color::White);
        for pair in game.moves.windows(2) {
            assert_eq!(pair[0].after.to_string(), pair[1].before.to_string());
        }
    }

    #[test]
    fn test_skips_comments_variations_and_nags() {
        let pgn = r#"[White "a"]
[Black "b"]

1. e4 { [%clk 0:03:00] } 1... e5 $1 (1... c5 2. Nf3 (2. c3 d5) d6) 2. Nf3 ; king's knight
Nc6 *"#;
        let game = parse_pgn(pgn).unwrap();
        let sans: Vec<&str> = game.moves.iter().map(|m| m.san.as_str()).collect();
        assert_eq!(sans, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(game.result, GameResult::Ongoing);
    }

    #[test]
    fn test_bracket_lines_inside_wrapped_comment_and_variation() {
        let comment = "[White \"a\"]\n[Black \"b\"]\n\n1. e4 {\n[%clk 0:03:00] } e5 2. Nf3 *";
        let game = parse_pgn(comment).unwrap();
        assert_eq!(game.moves.len(), 3);
        assert_eq!(game.tag("White"), Some("a"));

        let variation = "[White \"a\"]\n\n1. e4 (1. d4 {\n[%clk 0:02:59] }\n) e5 *";
        let game = parse_pgn(variation).unwrap();
        let sans: Vec<&str> = game.moves.iter().map(|m| m.san.as_str()).collect();
        assert_eq!(sans, vec!["e4", "e5"]);
    }

    #[test]
    fn test_semicolon_comment_does_not_open_spans() {
        let pgn = "[White \"a\"]\n\n1. d4 ; don't ( worry {\n*\n\n[White \"c\"]\n\n1. e4 *\n";
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.moves.len(), 1);
        assert_eq!(game.tag("White"), Some("a"));
    }

    #[test]
    fn test_glued_move_numbers_and_castling_zeros() {
        let pgn = "1.e4 e5 2.Nf3 Nc6 3.Bc4 Bc5 4.0-0 Nf6 1/2-1/2";
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.moves[6].san, "O-O");
        assert_eq!(game.result, GameResult::Draw);
    }

    #[test]
    fn test_fen_start_position() {
        let pgn = r#"[White "a"]
[Black "b"]
[SetUp "1"]
[FEN "4k3/8/8/8/8/8/8/R3K3 w - - 0 1"]

1. Ra8+ Kd7 *"#;
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.moves.len(), 2);
        assert_eq!(game.moves[0].san, "Ra8+");
    }

    #[test]
    fn test_illegal_move_reports_ply() {
        let pgn = "1. e4 e5 2. Ke3 *";
        match parse_pgn(pgn) {
            Err(PgnError::IllegalMove { ply, san, .. }) => {
                assert_eq!(ply, 3);
                assert_eq!(san, "Ke3");
            }
            other => panic!("expected illegal move error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_and_broken_input() {
        assert!(matches!(parse_pgn("   \n"), Err(PgnError::InvalidFormat(_))));
        assert!(matches!(parse_pgn("[White Alice]\n\n1. e4"), Err(PgnError::InvalidTag(_))));
        assert!(matches!(parse_pgn("1. e4 { open"), Err(PgnError::InvalidFormat(_))));
        assert!(matches!(
            parse_pgn("[FEN \"not a fen\"]\n\n*"),
            Err(PgnError::InvalidStart(_))
        ));
    }

    #[test]
    fn test_only_first_game_is_read() {
        let pgn = "[White \"a\"]\n\n1. d4 d5 *\n\n[White \"c\"]\n\n1. e4 *\n";
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.moves.len(), 2);
        assert_eq!(game.tag("White"), Some("a"));
    }
}
