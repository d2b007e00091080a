//! Text rendering for the "peek" view and the move list.
//!
//! This module turns game state into display strings.
//! It lives in the UI layer and depends on domain, not vice versa.

use crate::domain::{Board, Move, PieceColor, PlayedMove, Square};
use crate::ui::board_layout::{BoardLayout, Orientation};
use crate::ui::view_models::MoveRowDisplay;

/// Group the history into numbered rows
pub fn move_rows(history: &[PlayedMove]) -> Vec<MoveRowDisplay> {
    let mut rows: Vec<MoveRowDisplay> = Vec::new();
    for played in history {
        match played.color {
            PieceColor::White => rows.push(MoveRowDisplay {
                move_num: rows.last().map(|r| r.move_num + 1).unwrap_or(1),
                white: Some(played.san.clone()),
                black: None,
            }),
            PieceColor::Black => match rows.last_mut() {
                Some(row) if row.black.is_none() => row.black = Some(played.san.clone()),
                _ => rows.push(MoveRowDisplay {
                    move_num: rows.last().map(|r| r.move_num + 1).unwrap_or(1),
                    white: None,
                    black: Some(played.san.clone()),
                }),
            },
        }
    }
    rows
}

pub fn render_move_list(history: &[PlayedMove]) -> String {
    move_rows(history)
        .iter()
        .map(MoveRowDisplay::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the board as text, pieces in FEN letters and empty squares as '.'.
///
/// The squares of `last_move` are bracketed.
pub fn render_board(board: &Board, orientation: Orientation, last_move: Option<&Move>) -> String {
    let files = BoardLayout::file_labels(orientation);
    let ranks = BoardLayout::rank_labels(orientation);
    let marked = |square: Square| last_move.is_some_and(|m| m.from == square || m.to == square);

    let mut out = String::new();
    for rank_label in ranks.iter() {
        out.push(*rank_label);
        out.push(' ');
        for file_label in files.iter() {
            let square = Square::from_algebraic(&format!("{}{}", file_label, rank_label));
            let glyph = square
                .and_then(|sq| board.piece_at(sq))
                .map(|p| p.fen_char())
                .unwrap_or('.');
            match square {
                Some(sq) if marked(sq) => {
                    out.push('[');
                    out.push(glyph);
                    out.push(']');
                }
                _ => {
                    out.push(' ');
                    out.push(glyph);
                    out.push(' ');
                }
            }
        }
        out.push('\n');
    }
    out.push_str("  ");
    for file_label in files {
        out.push(' ');
        out.push(file_label);
        out.push(' ');
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PositionModel, ShakmatyOracle};

    fn model_after(moves: &[&str]) -> PositionModel<ShakmatyOracle> {
        let mut model = PositionModel::new(ShakmatyOracle::new());
        for text in moves {
            let mv = model.parse_move(text).unwrap();
            model.apply_move(&mv).unwrap();
        }
        model
    }

    #[test]
    fn test_move_rows() {
        let model = model_after(&["e4", "e5", "Nf3"]);
        let rows = move_rows(model.history());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].to_line(), "1. e4 e5");
        assert_eq!(rows[1].to_line(), "2. Nf3");
    }

    #[test]
    fn test_move_rows_black_start() {
        let fen = "7r/8/8/8/8/4k3/8/4K3 b - - 0 1";
        let mut model = PositionModel::from_fen(ShakmatyOracle::new(), fen).unwrap();
        for text in ["Rh2", "Kf1"] {
            let mv = model.parse_move(text).unwrap();
            model.apply_move(&mv).unwrap();
        }
        assert_eq!(render_move_list(model.history()), "1. ... Rh2\n2. Kf1");
    }

    #[test]
    fn test_render_start_board() {
        let text = render_board(&Board::default(), Orientation::Primary, None);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8  r  n  b  q  k  b  n  r ");
        assert_eq!(lines[7], "1  R  N  B  Q  K  B  N  R ");
        assert_eq!(lines[8], "   a  b  c  d  e  f  g  h ");
    }

    #[test]
    fn test_render_flipped_with_last_move() {
        let model = model_after(&["e4"]);
        let board = model.board().unwrap();
        let text = render_board(&board, Orientation::Flipped, model.last_move().map(|p| &p.mv));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "1  R  N  B  K  Q  B  N  R ");
        assert_eq!(lines[3], "4  .  .  . [P] .  .  .  . ");
        assert_eq!(lines[8], "   h  g  f  e  d  c  b  a ");
    }
}
