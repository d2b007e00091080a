//! Pure chess domain types and utilities.
//! No engine or rules-library dependencies - this is the domain layer.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase FEN letter for this kind
    pub fn fen_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'r' => Some(PieceKind::Rook),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Kinds a pawn may promote to
    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceColor::White => f.write_str("white"),
            PieceColor::Black => f.write_str("black"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    /// FEN letter: uppercase for white, lowercase for black
    pub fn fen_char(self) -> char {
        let c = self.kind.fen_char();
        match self.color {
            PieceColor::White => c.to_ascii_uppercase(),
            PieceColor::Black => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = PieceKind::from_fen_char(c)?;
        let color = if c.is_ascii_uppercase() {
            PieceColor::White
        } else {
            PieceColor::Black
        };
        Some(Piece { kind, color })
    }
}

/// Light or dark board square
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SquareShade {
    Light,
    Dark,
}

impl SquareShade {
    /// Shade of the square at `file`, `row` (row 0 = rank 8); a8 is light
    pub fn of(file: u8, row: u8) -> Self {
        if (file + row) % 2 == 1 {
            SquareShade::Dark
        } else {
            SquareShade::Light
        }
    }
}

impl fmt::Display for SquareShade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareShade::Light => write!(f, "light"),
            SquareShade::Dark => write!(f, "dark"),
        }
    }
}

/// A board square. `rank` 0 is the first rank ("1"), `file` 0 is the a-file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Build a square from 0-based file and rank, `None` when off the board
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// Parse "e4"-style text (case-insensitive)
    pub fn from_algebraic(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase().checked_sub(b'a')?;
        let rank = bytes[1].checked_sub(b'1')?;
        Self::new(file, rank)
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Square from a 0..64 index counted from a1 along the ranks
    pub(crate) fn from_index(index: usize) -> Self {
        Self {
            file: (index % 8) as u8,
            rank: ((index / 8) % 8) as u8,
        }
    }

    /// Row counted from the top of a white-oriented board (row 0 = rank 8)
    pub fn row(self) -> u8 {
        7 - self.rank
    }

    /// Slot in the 64-entry board array (0 = a8, row-major from the top)
    pub fn board_index(self) -> usize {
        self.row() as usize * 8 + self.file as usize
    }

    pub fn from_board_index(index: usize) -> Option<Self> {
        if index >= 64 {
            return None;
        }
        Self::new((index % 8) as u8, 7 - (index / 8) as u8)
    }

    /// All 64 squares, a1 first
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }

    /// a8 is light, a1 is dark
    pub fn shade(self) -> SquareShade {
        SquareShade::of(self.file, self.row())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, (b'1' + self.rank) as char)
    }
}

/// A move in compact coordinate form: from, to and an optional promotion
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Parse compact coordinate notation ("e2e4", "g7g8q").
    ///
    /// Only the shape is checked here; legality is the oracle's business.
    pub fn parse_coordinate(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.is_ascii() || !(text.len() == 4 || text.len() == 5) {
            return None;
        }
        let from = Square::from_algebraic(&text[0..2])?;
        let to = Square::from_algebraic(&text[2..4])?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => {
                let kind = PieceKind::from_fen_char(c)?;
                if !kind.is_promotion_target() {
                    return None;
                }
                Some(kind)
            }
        };
        Some(Self {
            from,
            to,
            promotion,
        })
    }

    /// Compact coordinate text as sent to the engine
    pub fn to_coordinate(&self) -> String {
        let mut s = format!("{}{}", self.from, self.to);
        if let Some(p) = self.promotion {
            s.push(p.fen_char());
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_coordinate())
    }
}

/// Terminal result of a game
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Checkmate { winner: PieceColor },
    Stalemate,
    Draw,
}

impl Outcome {
    /// PGN result token
    pub fn result_token(self) -> &'static str {
        match self {
            Outcome::Checkmate {
                winner: PieceColor::White,
            } => "1-0",
            Outcome::Checkmate {
                winner: PieceColor::Black,
            } => "0-1",
            Outcome::Stalemate | Outcome::Draw => "1/2-1/2",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Checkmate { .. } => "Checkmate!",
            Outcome::Stalemate => "Stalemate.",
            Outcome::Draw => "Draw.",
        }
    }
}
