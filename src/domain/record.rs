//! Game record export in PGN.
//!
//! The record is produced from the full ordered history; writing it anywhere
//! is the caller's concern.

use crate::domain::chess::{Outcome, PieceColor};
use crate::domain::position::PlayedMove;

/// Movetext lines are wrapped before this width
const PGN_LINE_WIDTH: usize = 80;

/// Header data for an exported game
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    pub event: String,
    pub site: String,
    /// PGN date ("YYYY.MM.DD"), unknown parts as '?'
    pub date: String,
    pub white: String,
    pub black: String,
    /// Custom starting position, emitted as SetUp/FEN tags
    pub start_fen: Option<String>,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self {
            event: "Blindfold training game".to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
            start_fen: None,
        }
    }
}

impl RecordMetadata {
    /// Names for a game of the user against the engine
    pub fn for_engine_game(user_side: PieceColor, skill_level: u8) -> Self {
        let engine = format!("Stockfish (Skill Level {})", skill_level);
        let (white, black) = match user_side {
            PieceColor::White => ("You".to_string(), engine),
            PieceColor::Black => (engine, "You".to_string()),
        };
        Self {
            white,
            black,
            ..Self::default()
        }
    }
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Serialize a game to PGN text
pub fn export_pgn(meta: &RecordMetadata, history: &[PlayedMove], outcome: Option<Outcome>) -> String {
    let result = outcome.map(Outcome::result_token).unwrap_or("*");

    let mut out = String::new();
    let mut tag = |name: &str, value: &str| {
        out.push_str(&format!("[{} \"{}\"]\n", name, escape_tag(value)));
    };
    tag("Event", &meta.event);
    tag("Site", &meta.site);
    tag("Date", &meta.date);
    tag("Round", "-");
    tag("White", &meta.white);
    tag("Black", &meta.black);
    tag("Result", result);
    if let Some(fen) = &meta.start_fen {
        tag("SetUp", "1");
        tag("FEN", fen);
    }
    out.push('\n');

    let mut tokens: Vec<String> = Vec::with_capacity(history.len() * 2 + 1);
    for (i, played) in history.iter().enumerate() {
        let (move_num, is_black) = played.move_number_from(history.first());
        if !is_black {
            tokens.push(format!("{}.", move_num));
        } else if i == 0 {
            // game starts with black to move
            tokens.push(format!("{}...", move_num));
        }
        tokens.push(played.san.clone());
    }
    tokens.push(result.to_string());

    let mut line_len = 0;
    for token in tokens {
        if line_len > 0 && line_len + 1 + token.len() > PGN_LINE_WIDTH {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        line_len += token.len();
        out.push_str(&token);
    }
    out.push('\n');
    out
}

impl PlayedMove {
    /// Move number relative to a game that may have started with black to move
    fn move_number_from(&self, first: Option<&PlayedMove>) -> (usize, bool) {
        let black_started = first.map(|m| m.color == PieceColor::Black).unwrap_or(false);
        if black_started {
            // ply 1 is black's first move of move 1
            let move_num = self.ply / 2 + 1;
            (move_num, self.color == PieceColor::Black)
        } else {
            self.move_number()
        }
    }
}
