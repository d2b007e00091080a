//! FEN placement encoding for the 64-slot board.
//!
//! Only the placement field is interpreted. The remaining FEN fields are kept
//! as text and written back unchanged.

use std::fmt;

use crate::domain::chess::{Piece, PieceColor, Square};
use crate::error::FenError;

/// Standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Piece placement, slot 0 = a8, row-major from the top
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    slots: [Option<Piece>; 64],
}

impl Board {
    pub fn empty() -> Self {
        Self { slots: [None; 64] }
    }

    /// Decode a placement field (or a full FEN, whose other fields are ignored)
    pub fn from_fen(text: &str) -> Result<Self, FenError> {
        let placement = text.split_whitespace().next().ok_or(FenError::Empty)?;
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(FenError::RankCount { found: rows.len() });
        }

        let mut board = Self::empty();
        for (row, row_text) in rows.iter().enumerate() {
            let mut file = 0usize;
            for c in row_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::RankWidth { rank: 8 - row });
                    }
                    file += skip as usize;
                } else {
                    let piece = Piece::from_fen_char(c).ok_or(FenError::Piece { found: c })?;
                    if file >= 8 {
                        return Err(FenError::RankWidth { rank: 8 - row });
                    }
                    board.slots[row * 8 + file] = Some(piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::RankWidth { rank: 8 - row });
                }
            }
            if file != 8 {
                return Err(FenError::RankWidth { rank: 8 - row });
            }
        }
        Ok(board)
    }

    /// Encode the placement field
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(72);
        for row in 0..8 {
            if row > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for file in 0..8 {
                match self.slots[row * 8 + file] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.slots[square.board_index()]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.slots[square.board_index()] = piece;
    }

    /// All 64 slots in board-index order
    pub fn slots(&self) -> &[Option<Piece>; 64] {
        &self.slots
    }

    /// Number of occupied squares
    pub fn piece_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        // START_FEN is a constant known to decode
        Self::from_fen(START_FEN).unwrap_or_else(|_| Self::empty())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

/// A full FEN: decoded placement plus the untouched trailing fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fen {
    pub board: Board,
    pub side_to_move: PieceColor,
    /// Castling, en passant and clocks exactly as given
    pub rest: Vec<String>,
}

impl Fen {
    pub fn parse(text: &str) -> Result<Self, FenError> {
        let mut fields = text.split_whitespace();
        let placement = fields.next().ok_or(FenError::Empty)?;
        let board = Board::from_fen(placement)?;
        let side_to_move = match fields.next() {
            Some("w") | None => PieceColor::White,
            Some("b") => PieceColor::Black,
            Some(other) => {
                return Err(FenError::SideToMove {
                    found: other.to_string(),
                });
            }
        };
        Ok(Self {
            board,
            side_to_move,
            rest: fields.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side_to_move {
            PieceColor::White => "w",
            PieceColor::Black => "b",
        };
        write!(f, "{} {}", self.board.to_fen(), side)?;
        for field in &self.rest {
            write!(f, " {}", field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chess::PieceKind;

    const PLACEMENTS: &[&str] = &[
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
        "8/8/8/8/8/8/8/8",
        "8/8/8/4R3/8/4K3/8/5k2",
        "7k/8/1K6/1R6/1R5P/8/8/8",
        "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1",
        "N7/8/8/8/8/8/8/7b",
    ];

    #[test]
    fn test_placement_round_trip() {
        for placement in PLACEMENTS {
            let board = Board::from_fen(placement).unwrap();
            assert_eq!(&board.to_fen(), placement);
        }
    }

    #[test]
    fn test_start_position_slots() {
        let board = Board::default();
        assert_eq!(board.piece_count(), 32);
        let a8 = Square::from_algebraic("a8").unwrap();
        let e1 = Square::from_algebraic("e1").unwrap();
        assert_eq!(board.slots()[0].map(|p| p.fen_char()), Some('r'));
        assert_eq!(
            board.piece_at(e1),
            Some(Piece {
                kind: PieceKind::King,
                color: PieceColor::White
            })
        );
        assert_eq!(board.piece_at(a8).map(|p| p.color), Some(PieceColor::Black));
    }

    #[test]
    fn test_full_fen_rest_passes_through() {
        let fen = Fen::parse(START_FEN).unwrap();
        assert_eq!(fen.side_to_move, PieceColor::White);
        assert_eq!(fen.to_string(), START_FEN);

        let odd = "8/8/8/8/8/8/8/K6k b - - 12 40";
        assert_eq!(Fen::parse(odd).unwrap().to_string(), odd);
    }

    #[test]
    fn test_side_to_move_token() {
        assert_eq!(
            Fen::parse("8/8/8/8/8/8/8/K6k x - - 0 1"),
            Err(FenError::SideToMove {
                found: "x".to_string()
            })
        );
        let placement_only = Fen::parse("8/8/8/8/8/8/8/K6k").unwrap();
        assert_eq!(placement_only.side_to_move, PieceColor::White);
    }

    #[test]
    fn test_bad_placements() {
        assert_eq!(Board::from_fen(""), Err(FenError::Empty));
        assert_eq!(
            Board::from_fen("8/8/8"),
            Err(FenError::RankCount { found: 3 })
        );
        assert_eq!(
            Board::from_fen("9/8/8/8/8/8/8/8"),
            Err(FenError::RankWidth { rank: 8 })
        );
        assert_eq!(
            Board::from_fen("ppppppppp/8/8/8/8/8/8/8"),
            Err(FenError::RankWidth { rank: 8 })
        );
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/7"),
            Err(FenError::RankWidth { rank: 1 })
        );
        assert_eq!(
            Board::from_fen("8/8/8/3x4/8/8/8/8"),
            Err(FenError::Piece { found: 'x' })
        );
    }
}
