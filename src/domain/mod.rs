//! Domain layer: chess types, FEN, the Move Oracle seam, the position model,
//! game records and the UCI wire format.

pub mod chess;
pub mod fen;
pub mod oracle;
pub mod position;
pub mod record;
pub mod uci;

pub use chess::{Move, Outcome, Piece, PieceColor, PieceKind, Square, SquareShade};
pub use fen::{Board, Fen, START_FEN};
pub use oracle::{AppliedMove, MoveOracle, ShakmatyOracle};
pub use position::{GameState, PlayedMove, PositionModel};
pub use record::{RecordMetadata, export_pgn};
