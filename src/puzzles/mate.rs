//! Mate trainer: find the forced line from a fixed position.
//!
//! Each puzzle carries its full solution in coordinate notation, both sides
//! alternating. The user supplies the solver's moves; replies are auto-played.

use tracing::warn;

use crate::domain::{Move, MoveOracle, Outcome, PieceColor, PositionModel};
use crate::error::{FenError, MoveError};
use crate::ui::{Orientation, render_board};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatePuzzle {
    pub id: &'static str,
    pub title: &'static str,
    pub fen: &'static str,
    /// Principal variation, solver's moves at even indices
    pub solution: &'static [&'static str],
}

pub const BUILTIN_PUZZLES: &[MatePuzzle] = &[
    MatePuzzle {
        id: "cm-001",
        title: "KR vs k",
        fen: "8/8/8/4R3/8/4K3/8/5k2 w - - 0 1",
        solution: &["e5g5", "f1e1", "g5g1"],
    },
    MatePuzzle {
        id: "cm-002",
        title: "KRR vs k",
        fen: "7k/8/1K6/1R6/1R5P/8/8/8 w - - 0 1",
        solution: &["b4g4", "h8h7", "b5h5"],
    },
    MatePuzzle {
        id: "cm-003",
        title: "KRQ vs kp",
        fen: "1k6/p4Q2/8/8/8/8/K6R/8 w - - 0 1",
        solution: &["h2h8"],
    },
    MatePuzzle {
        id: "cm-005",
        title: "KQN vs krpp",
        fen: "1r5k/6pp/7N/8/8/8/Q7/6K1 w - - 0 1",
        solution: &["a2g8", "b8g8", "h6f7"],
    },
];

impl MatePuzzle {
    pub fn by_id(id: &str) -> Option<&'static MatePuzzle> {
        BUILTIN_PUZZLES.iter().find(|p| p.id == id)
    }

    pub fn random(rng: &mut fastrand::Rng) -> &'static MatePuzzle {
        &BUILTIN_PUZZLES[rng.usize(..BUILTIN_PUZZLES.len())]
    }

    /// How many moves the solver has to find
    pub fn moves_to_find(&self) -> usize {
        self.solution.len().div_ceil(2)
    }
}

/// Result of one submitted move
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MateVerdict {
    /// Right move; the opponent answered with `reply`
    Correct { reply: Option<String> },
    Solved,
    Wrong { expected: String },
    Invalid(MoveError),
}

/// One attempt at a mate puzzle
pub struct MateSession<O: MoveOracle> {
    puzzle: &'static MatePuzzle,
    position: PositionModel<O>,
    /// Index into the solution of the next move the user must find
    next_ply: usize,
    solved: bool,
}

impl<O: MoveOracle> MateSession<O> {
    pub fn new(oracle: O, puzzle: &'static MatePuzzle) -> Result<Self, FenError> {
        let position = PositionModel::from_fen(oracle, puzzle.fen)?;
        Ok(Self {
            puzzle,
            position,
            next_ply: 0,
            solved: false,
        })
    }

    pub fn puzzle(&self) -> &'static MatePuzzle {
        self.puzzle
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Side the user plays
    pub fn solver(&self) -> PieceColor {
        match self.position.history().first() {
            Some(first) => first.color,
            None => self.position.side_to_move(),
        }
    }

    /// Moves found so far
    pub fn found(&self) -> usize {
        self.next_ply.div_ceil(2)
    }

    pub fn submit(&mut self, text: &str) -> MateVerdict {
        if self.solved {
            return MateVerdict::Solved;
        }
        let Some(expected) = self.puzzle.solution.get(self.next_ply).copied() else {
            self.solved = true;
            return MateVerdict::Solved;
        };
        let mv = match self.position.parse_move(text) {
            Ok(mv) => mv,
            Err(e) => return MateVerdict::Invalid(e),
        };

        if !mv.to_coordinate().eq_ignore_ascii_case(expected) && !self.delivers_mate(&mv) {
            return MateVerdict::Wrong {
                expected: expected.to_string(),
            };
        }
        if let Err(e) = self.position.apply_move(&mv) {
            return MateVerdict::Invalid(e.into());
        }
        self.next_ply += 2;

        if self.position.outcome().is_some() || self.next_ply >= self.puzzle.solution.len() {
            self.solved = true;
            return MateVerdict::Solved;
        }

        let reply = self.puzzle.solution[self.next_ply - 1];
        let applied = Move::parse_coordinate(reply)
            .ok_or_else(|| "unparsable".to_string())
            .and_then(|m| self.position.apply_move(&m).map(|_| ()).map_err(|e| e.to_string()));
        match applied {
            Ok(()) => MateVerdict::Correct {
                reply: Some(reply.to_string()),
            },
            Err(reason) => {
                warn!(puzzle = self.puzzle.id, %reply, %reason, "puzzle reply does not apply");
                MateVerdict::Correct { reply: None }
            }
        }
    }

    /// The whole solution line
    pub fn reveal(&self) -> String {
        self.puzzle.solution.join(" ")
    }

    pub fn peek(&self, orientation: Orientation) -> Result<String, FenError> {
        let board = self.position.board()?;
        Ok(render_board(&board, orientation, self.position.last_move().map(|p| &p.mv)))
    }

    pub fn position(&self) -> &PositionModel<O> {
        &self.position
    }

    fn delivers_mate(&self, mv: &Move) -> bool {
        let oracle = self.position.oracle();
        match oracle.apply_move(self.position.position(), mv) {
            Ok(applied) => matches!(oracle.outcome(&applied.position), Some(Outcome::Checkmate { .. })),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShakmatyOracle;

    fn session(id: &str) -> MateSession<ShakmatyOracle> {
        let puzzle = MatePuzzle::by_id(id).unwrap();
        MateSession::new(ShakmatyOracle::new(), puzzle).unwrap()
    }

    #[test]
    fn test_builtin_puzzles_load() {
        for puzzle in BUILTIN_PUZZLES {
            let session = MateSession::new(ShakmatyOracle::new(), puzzle).unwrap();
            assert_eq!(session.solver(), PieceColor::White);
        }
    }

    #[test]
    fn test_builtin_solutions_end_in_mate() {
        for puzzle in BUILTIN_PUZZLES {
            let mut session = MateSession::new(ShakmatyOracle::new(), puzzle).unwrap();
            for (i, mv) in puzzle.solution.iter().enumerate().step_by(2) {
                let verdict = session.submit(mv);
                if i + 1 >= puzzle.solution.len() {
                    assert_eq!(verdict, MateVerdict::Solved, "{}", puzzle.id);
                } else {
                    assert!(matches!(verdict, MateVerdict::Correct { reply: Some(_) }), "{}", puzzle.id);
                }
            }
            assert!(
                matches!(
                    session.position().outcome(),
                    Some(Outcome::Checkmate { .. })
                ),
                "{}",
                puzzle.id
            );
        }
    }

    #[test]
    fn test_mate_in_two_flow() {
        let mut s = session("cm-001");
        assert_eq!(s.puzzle().moves_to_find(), 2);
        assert_eq!(
            s.submit("Rg5"),
            MateVerdict::Correct {
                reply: Some("f1e1".to_string())
            }
        );
        assert_eq!(s.found(), 1);
        assert_eq!(s.submit("g5g1"), MateVerdict::Solved);
        assert!(s.is_solved());
        assert_eq!(s.submit("e3e4"), MateVerdict::Solved);
    }

    #[test]
    fn test_wrong_and_invalid() {
        let mut s = session("cm-003");
        assert_eq!(
            s.submit("f7f8"),
            MateVerdict::Wrong {
                expected: "h2h8".to_string()
            }
        );
        assert!(matches!(s.submit("zz"), MateVerdict::Invalid(MoveError::InputFormat { .. })));
        assert!(matches!(s.submit("h2a8"), MateVerdict::Invalid(MoveError::Illegal(_))));
        assert!(s.position().history().is_empty());
    }

    #[test]
    fn test_reveal_and_peek() {
        let s = session("cm-005");
        assert_eq!(s.reveal(), "a2g8 b8g8 h6f7");
        let board = s.peek(Orientation::Primary).unwrap();
        assert!(board.starts_with("8  .  r  .  .  .  .  .  k "));
    }
}
