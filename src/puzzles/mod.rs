//! Training puzzles: single-piece shortest paths, forced mates, square
//! colours and coordinate taps.

pub mod coords;
pub mod mate;
pub mod path;
pub mod square_color;

pub use coords::{CoordTrainer, RoundSummary, TapVerdict};
pub use mate::{BUILTIN_PUZZLES, MatePuzzle, MateSession, MateVerdict};
pub use path::{
    BishopGraph, KnightGraph, MoveGraph, PathGrade, PathPiece, PathPuzzle, PathQuery, PathResult, PathSolver,
    shortest_path,
};
pub use square_color::{ColorQuiz, ColorVerdict, parse_shade};
