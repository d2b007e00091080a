//! Move Oracle - the rules capability the core consumes but does not implement.
//!
//! The trait keeps the rules library's position type opaque behind an
//! associated type. `ShakmatyOracle` is the production implementation.

use shakmaty::fen::Fen as ShakmatyFen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color as SColor, EnPassantMode, File, Position, Rank, Role,
    attacks,
};

use crate::domain::chess::{Move, Outcome, PieceColor, PieceKind, Square};
use crate::error::{FenError, IllegalMoveError, MoveError};

/// A move accepted by the oracle, with the resulting position
#[derive(Clone, Debug)]
pub struct AppliedMove<P> {
    pub position: P,
    pub mv: Move,
    /// Standard algebraic notation including check/mate suffix
    pub san: String,
}

/// Legal move generation and validation
pub trait MoveOracle {
    type Position: Clone;

    fn starting_position(&self) -> Self::Position;

    fn position_from_fen(&self, fen: &str) -> Result<Self::Position, FenError>;

    fn fen(&self, position: &Self::Position) -> String;

    fn side_to_move(&self, position: &Self::Position) -> PieceColor;

    /// Destinations of the piece standing on `from`
    fn legal_destinations(&self, position: &Self::Position, from: Square) -> Vec<Square>;

    /// Resolve algebraic notation to a move in `position`
    fn resolve_san(&self, position: &Self::Position, text: &str) -> Result<Move, MoveError>;

    /// Play `mv` on a copy of `position`
    fn apply_move(
        &self,
        position: &Self::Position,
        mv: &Move,
    ) -> Result<AppliedMove<Self::Position>, IllegalMoveError>;

    fn outcome(&self, position: &Self::Position) -> Option<Outcome>;

    /// Identity of a position for repetition counting: placement, side,
    /// castling rights and en passant square, ignoring the move clocks
    fn repetition_key(&self, position: &Self::Position) -> String {
        let fen = self.fen(position);
        fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }

    /// Destinations of a lone `kind` on `from` with the rest of the board empty
    fn single_piece_destinations(&self, kind: PieceKind, from: Square) -> Vec<Square>;
}

/// Half-moves without a capture or pawn move that end the game
const FIFTY_MOVE_PLIES: u32 = 100;

/// Move Oracle backed by shakmaty
#[derive(Clone, Copy, Debug, Default)]
pub struct ShakmatyOracle;

impl ShakmatyOracle {
    pub fn new() -> Self {
        Self
    }
}

fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::from_coords(
        File::new(u32::from(square.file())),
        Rank::new(u32::from(square.rank())),
    )
}

fn from_shakmaty_square(square: shakmaty::Square) -> Square {
    Square::from_index(usize::from(square))
}

fn to_role(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn from_color(color: SColor) -> PieceColor {
    match color {
        SColor::White => PieceColor::White,
        SColor::Black => PieceColor::Black,
    }
}

/// Convert a shakmaty move to coordinate form. Castling is reported as the
/// king's two-square step, the way UCI engines expect it.
fn from_shakmaty_move(m: &shakmaty::Move) -> Option<Move> {
    let (from, to, promotion) = match m {
        shakmaty::Move::Normal {
            from,
            to,
            promotion,
            ..
        } => (*from, *to, promotion.map(from_role)),
        shakmaty::Move::EnPassant { from, to } => (*from, *to, None),
        shakmaty::Move::Castle { king, rook } => {
            let king_dest = if rook.file() == File::H {
                shakmaty::Square::from_coords(File::G, rook.rank())
            } else {
                shakmaty::Square::from_coords(File::C, rook.rank())
            };
            (*king, king_dest, None)
        }
        shakmaty::Move::Put { .. } => return None,
    };
    Some(Move {
        from: from_shakmaty_square(from),
        to: from_shakmaty_square(to),
        promotion,
    })
}

impl MoveOracle for ShakmatyOracle {
    type Position = Chess;

    fn starting_position(&self) -> Chess {
        Chess::default()
    }

    fn position_from_fen(&self, fen: &str) -> Result<Chess, FenError> {
        let parsed: ShakmatyFen = fen.trim().parse().map_err(|e| FenError::Position {
            message: format!("{}", e),
        })?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| FenError::Position {
                message: format!("{}", e),
            })
    }

    fn fen(&self, position: &Chess) -> String {
        let side = match position.turn() {
            SColor::White => "w",
            SColor::Black => "b",
        };

        let rights = position.castles().castling_rights();
        let mut castling = String::new();
        for (corner, c) in [
            (shakmaty::Square::H1, 'K'),
            (shakmaty::Square::A1, 'Q'),
            (shakmaty::Square::H8, 'k'),
            (shakmaty::Square::A8, 'q'),
        ] {
            if rights.contains(corner) {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = position
            .ep_square(EnPassantMode::Legal)
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            position.board(),
            side,
            castling,
            ep,
            position.halfmoves(),
            position.fullmoves()
        )
    }

    fn side_to_move(&self, position: &Chess) -> PieceColor {
        from_color(position.turn())
    }

    fn legal_destinations(&self, position: &Chess, from: Square) -> Vec<Square> {
        let mut out = Vec::new();
        for m in &position.legal_moves() {
            if let Some(mv) = from_shakmaty_move(m) {
                if mv.from == from && !out.contains(&mv.to) {
                    out.push(mv.to);
                }
            }
        }
        out
    }

    fn resolve_san(&self, position: &Chess, text: &str) -> Result<Move, MoveError> {
        // Players type 0-0 as often as O-O
        let normalized = text.trim().replace('0', "O");
        let san: San = normalized.parse().map_err(|_| MoveError::InputFormat {
            input: text.trim().to_string(),
        })?;
        let m = san.to_move(position).map_err(|e| {
            MoveError::Illegal(IllegalMoveError {
                mv: text.trim().to_string(),
                reason: e.to_string(),
            })
        })?;
        from_shakmaty_move(&m).ok_or_else(|| MoveError::InputFormat {
            input: text.trim().to_string(),
        })
    }

    fn apply_move(&self, position: &Chess, mv: &Move) -> Result<AppliedMove<Chess>, IllegalMoveError> {
        let uci = UciMove::Normal {
            from: to_shakmaty_square(mv.from),
            to: to_shakmaty_square(mv.to),
            promotion: mv.promotion.map(to_role),
        };
        let m = uci
            .to_move(position)
            .map_err(|_| IllegalMoveError::new(mv, "not legal in this position"))?;

        let mut san = San::from_move(position, m.clone()).to_string();
        let next = position
            .clone()
            .play(m.clone())
            .map_err(|_| IllegalMoveError::new(mv, "rejected by the rules library"))?;
        if next.is_checkmate() {
            san.push('#');
        } else if next.is_check() {
            san.push('+');
        }

        // Canonical form: castling may have been given king-takes-rook style
        let canonical = from_shakmaty_move(&m).unwrap_or(*mv);
        Ok(AppliedMove {
            position: next,
            mv: canonical,
            san,
        })
    }

    fn outcome(&self, position: &Chess) -> Option<Outcome> {
        if position.is_checkmate() {
            Some(Outcome::Checkmate {
                winner: from_color(position.turn()).opposite(),
            })
        } else if position.is_stalemate() {
            Some(Outcome::Stalemate)
        } else if position.is_insufficient_material() || position.halfmoves() >= FIFTY_MOVE_PLIES {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    fn single_piece_destinations(&self, kind: PieceKind, from: Square) -> Vec<Square> {
        let sq = to_shakmaty_square(from);
        let empty = Bitboard::EMPTY;
        let targets = match kind {
            PieceKind::Knight => attacks::knight_attacks(sq),
            PieceKind::Bishop => attacks::bishop_attacks(sq, empty),
            PieceKind::Rook => attacks::rook_attacks(sq, empty),
            PieceKind::Queen => attacks::queen_attacks(sq, empty),
            PieceKind::King => attacks::king_attacks(sq),
            // a lone white pawn only pushes
            PieceKind::Pawn => {
                let mut pushes: Vec<Square> = Square::new(from.file(), from.rank() + 1)
                    .into_iter()
                    .collect();
                if from.rank() == 1 {
                    pushes.extend(Square::new(from.file(), 3));
                }
                return pushes;
            }
        };
        targets.into_iter().map(from_shakmaty_square).collect()
    }
}
