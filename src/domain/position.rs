//! Position model: the authoritative game position plus its move history.
//!
//! Legality is always delegated to the Move Oracle. A rejected move leaves
//! the model untouched.

use std::collections::HashMap;

use crate::domain::chess::{Move, Outcome, PieceColor};
use crate::domain::fen::Board;
use crate::domain::oracle::MoveOracle;
use crate::error::{FenError, IllegalMoveError, MoveError};

/// A move that has been played, as recorded in the history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayedMove {
    pub mv: Move,
    /// SAN including check/mate suffix
    pub san: String,
    /// Half-move number; the first move of the game is ply 1
    pub ply: usize,
    /// Side that played the move
    pub color: PieceColor,
}

impl PlayedMove {
    /// Compact coordinate text ("e2e4")
    pub fn coordinate(&self) -> String {
        self.mv.to_coordinate()
    }

    /// Move number (1-based) and whether this is black's move
    pub fn move_number(&self) -> (usize, bool) {
        let move_num = (self.ply + 1) / 2;
        let is_black = self.ply % 2 == 0;
        (move_num, is_black)
    }
}

/// Snapshot of the game for collaborators that don't hold the oracle
#[derive(Clone, Debug)]
pub struct GameState {
    pub board: Board,
    pub side_to_move: PieceColor,
    pub history: Vec<PlayedMove>,
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

/// The live position and its append-only history
pub struct PositionModel<O: MoveOracle> {
    oracle: O,
    /// Custom starting FEN, `None` for the standard start
    start_fen: Option<String>,
    position: O::Position,
    history: Vec<PlayedMove>,
    outcome: Option<Outcome>,
    /// Occurrences of each position since the start, keyed by repetition key
    occurrences: HashMap<String, usize>,
}

/// Occurrences of one position that draw the game
const REPETITION_LIMIT: usize = 3;

impl<O: MoveOracle> PositionModel<O> {
    /// Create a model at the standard starting position
    pub fn new(oracle: O) -> Self {
        let position = oracle.starting_position();
        let mut model = Self {
            oracle,
            start_fen: None,
            position,
            history: Vec::new(),
            outcome: None,
            occurrences: HashMap::new(),
        };
        model.record_occurrence();
        model
    }

    /// Create a model starting from a custom FEN
    pub fn from_fen(oracle: O, fen: &str) -> Result<Self, FenError> {
        let mut model = Self::new(oracle);
        model.reset_to_fen(fen)?;
        Ok(model)
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Clear to the standard starting position
    pub fn reset(&mut self) {
        self.position = self.oracle.starting_position();
        self.start_fen = None;
        self.history.clear();
        self.outcome = None;
        self.occurrences.clear();
        self.record_occurrence();
    }

    /// Clear to a custom starting position
    pub fn reset_to_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let start = self.oracle.position_from_fen(fen)?;
        self.outcome = self.oracle.outcome(&start);
        self.position = start;
        self.start_fen = Some(fen.trim().to_string());
        self.history.clear();
        self.occurrences.clear();
        self.record_occurrence();
        Ok(())
    }

    /// Count the live position; returns how often it has now occurred
    fn record_occurrence(&mut self) -> usize {
        let key = self.oracle.repetition_key(&self.position);
        let count = self.occurrences.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    pub fn start_fen(&self) -> Option<&str> {
        self.start_fen.as_deref()
    }

    pub fn position(&self) -> &O::Position {
        &self.position
    }

    /// Full FEN of the live position
    pub fn fen(&self) -> String {
        self.oracle.fen(&self.position)
    }

    pub fn board(&self) -> Result<Board, FenError> {
        Board::from_fen(&self.fen())
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.oracle.side_to_move(&self.position)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Ordered list of played moves
    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    /// History in compact coordinate form, as the engine wants it
    pub fn coordinate_history(&self) -> Vec<String> {
        self.history.iter().map(PlayedMove::coordinate).collect()
    }

    pub fn last_move(&self) -> Option<&PlayedMove> {
        self.history.last()
    }

    pub fn state(&self) -> Result<GameState, FenError> {
        Ok(GameState {
            board: self.board()?,
            side_to_move: self.side_to_move(),
            history: self.history.clone(),
            outcome: self.outcome,
        })
    }

    /// Turn move text into a legal move without touching the live position.
    ///
    /// Coordinate notation is tried first and validated on a disposable copy;
    /// anything else goes to the oracle as algebraic notation.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveError> {
        let raw = text.trim();
        if raw.is_empty() {
            return Err(MoveError::InputFormat {
                input: raw.to_string(),
            });
        }
        if let Some(mv) = Move::parse_coordinate(raw) {
            let applied = self.oracle.apply_move(&self.position, &mv)?;
            return Ok(applied.mv);
        }
        self.oracle.resolve_san(&self.position, raw)
    }

    /// Play a move, appending it to the history
    pub fn apply_move(&mut self, mv: &Move) -> Result<&PlayedMove, IllegalMoveError> {
        if self.outcome.is_some() {
            return Err(IllegalMoveError::new(mv, "the game is over"));
        }
        let color = self.side_to_move();
        let applied = self.oracle.apply_move(&self.position, mv)?;
        self.position = applied.position;
        let seen = self.record_occurrence();
        self.outcome = self.oracle.outcome(&self.position).or_else(|| {
            (seen >= REPETITION_LIMIT).then_some(Outcome::Draw)
        });
        let ply = self.history.len() + 1;
        self.history.push(PlayedMove {
            mv: applied.mv,
            san: applied.san,
            ply,
            color,
        });
        Ok(&self.history[ply - 1])
    }
}
