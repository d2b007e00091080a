//! Board layout calculations - square/pixel transforms for rendering and input.
//!
//! Squares are addressed as `(file, row)` with row 0 at rank 8, so the
//! primary orientation puts a8 in the top-left corner.

use crate::domain::{PieceColor, Square, SquareShade};

/// Which side of the board is drawn at the bottom
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// White at the bottom, a8 top-left
    #[default]
    Primary,
    /// Black at the bottom, h1 top-left
    Flipped,
}

impl Orientation {
    /// Orientation that puts `side` at the bottom
    pub fn for_side(side: PieceColor) -> Self {
        match side {
            PieceColor::White => Orientation::Primary,
            PieceColor::Black => Orientation::Flipped,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Orientation::Primary => Orientation::Flipped,
            Orientation::Flipped => Orientation::Primary,
        }
    }
}

/// Float error tolerated, in ulps of the square count, when a pixel lies on a
/// square's leading edge
const EDGE_ULPS: f32 = 8.0;

/// Index of the square a board coordinate falls in, `t` in squares.
///
/// Only a value within float error below the next integer snaps up, so any
/// pixel genuinely inside a square stays in it.
fn square_index(t: f32) -> u8 {
    let tolerance = t.max(1.0) * f32::EPSILON * EDGE_ULPS;
    let floor = t.floor();
    let index = if t - floor > 1.0 - tolerance { floor + 1.0 } else { floor };
    (index as u8).min(7)
}

/// Top-left pixel of the square at `file`, `row` on a board of side `size`.
///
/// `file` and `row` must be in 0..8.
pub fn square_to_pixel(file: u8, row: u8, orientation: Orientation, size: f32) -> (f32, f32) {
    debug_assert!(file < 8 && row < 8, "square ({}, {}) is off the board", file, row);
    let square_size = size / 8.0;
    let (col, line) = match orientation {
        Orientation::Primary => (file, row),
        Orientation::Flipped => (7u8.saturating_sub(file), 7u8.saturating_sub(row)),
    };
    (col as f32 * square_size, line as f32 * square_size)
}

/// Square `(file, row)` under a pixel, `None` outside the board
pub fn pixel_to_square(x: f32, y: f32, orientation: Orientation, size: f32) -> Option<(u8, u8)> {
    if size <= 0.0 || x < 0.0 || y < 0.0 || x >= size || y >= size {
        return None;
    }
    let square_size = size / 8.0;
    let col = square_index(x / square_size);
    let line = square_index(y / square_size);
    Some(match orientation {
        Orientation::Primary => (col, line),
        Orientation::Flipped => (7 - col, 7 - line),
    })
}

/// Shade of a square; does not depend on orientation
pub fn square_shade(file: u8, row: u8) -> SquareShade {
    SquareShade::of(file, row)
}

/// A board of `size` pixels drawn inside `padding` on every side
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardLayout {
    pub size: f32,
    pub padding: f32,
}

impl BoardLayout {
    pub fn new(size: f32, padding: f32) -> Self {
        Self { size, padding }
    }

    pub fn square_size(&self) -> f32 {
        self.size / 8.0
    }

    /// Total extent including padding on both sides
    pub fn outer_size(&self) -> f32 {
        self.size + self.padding * 2.0
    }

    /// Top-left pixel of a square, relative to the padded panel
    pub fn square_origin(&self, square: Square, orientation: Orientation) -> (f32, f32) {
        let (x, y) = square_to_pixel(square.file(), square.row(), orientation, self.size);
        (x + self.padding, y + self.padding)
    }

    /// Center pixel of a square, relative to the padded panel
    pub fn square_center(&self, square: Square, orientation: Orientation) -> (f32, f32) {
        let (x, y) = self.square_origin(square, orientation);
        let half = self.square_size() / 2.0;
        (x + half, y + half)
    }

    /// Convert a position relative to the padded panel to a square
    pub fn hit_test(&self, x: f32, y: f32, orientation: Orientation) -> Option<Square> {
        let (file, row) = pixel_to_square(x - self.padding, y - self.padding, orientation, self.size)?;
        Square::new(file, 7 - row)
    }

    /// File letters left to right
    pub fn file_labels(orientation: Orientation) -> [char; 8] {
        let mut labels = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
        if orientation == Orientation::Flipped {
            labels.reverse();
        }
        labels
    }

    /// Rank digits top to bottom
    pub fn rank_labels(orientation: Orientation) -> [char; 8] {
        let mut labels = ['8', '7', '6', '5', '4', '3', '2', '1'];
        if orientation == Orientation::Flipped {
            labels.reverse();
        }
        labels
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::new(480.0, 20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIENTATIONS: [Orientation; 2] = [Orientation::Primary, Orientation::Flipped];

    #[test]
    fn test_transform_is_invertible() {
        for size in [480.0, 333.3, 97.0, 8.0] {
            for orientation in ORIENTATIONS {
                for file in 0..8 {
                    for row in 0..8 {
                        let (x, y) = square_to_pixel(file, row, orientation, size);
                        assert_eq!(
                            pixel_to_square(x, y, orientation, size),
                            Some((file, row)),
                            "size {} {:?} ({}, {})",
                            size,
                            orientation,
                            file,
                            row
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_primary_and_flipped_corners() {
        assert_eq!(square_to_pixel(0, 0, Orientation::Primary, 480.0), (0.0, 0.0));
        assert_eq!(square_to_pixel(7, 7, Orientation::Primary, 480.0), (420.0, 420.0));
        assert_eq!(square_to_pixel(0, 0, Orientation::Flipped, 480.0), (420.0, 420.0));
        assert_eq!(square_to_pixel(7, 7, Orientation::Flipped, 480.0), (0.0, 0.0));
    }

    #[test]
    fn test_pixel_outside_board() {
        assert_eq!(pixel_to_square(-0.5, 10.0, Orientation::Primary, 480.0), None);
        assert_eq!(pixel_to_square(10.0, 480.0, Orientation::Primary, 480.0), None);
        assert_eq!(pixel_to_square(479.9, 0.0, Orientation::Primary, 480.0), Some((7, 0)));
    }

    #[test]
    fn test_pixel_just_inside_square_edge() {
        assert_eq!(pixel_to_square(59.95, 10.0, Orientation::Primary, 480.0), Some((0, 0)));
        assert_eq!(pixel_to_square(60.0, 10.0, Orientation::Primary, 480.0), Some((1, 0)));
        assert_eq!(pixel_to_square(10.0, 119.9, Orientation::Primary, 480.0), Some((0, 1)));
        assert_eq!(pixel_to_square(59.95, 59.95, Orientation::Flipped, 480.0), Some((7, 7)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "off the board")]
    fn test_square_to_pixel_rejects_off_board() {
        square_to_pixel(8, 0, Orientation::Flipped, 480.0);
    }

    #[test]
    fn test_square_shade() {
        assert_eq!(square_shade(0, 0), SquareShade::Light); // a8
        assert_eq!(square_shade(0, 7), SquareShade::Dark); // a1
        assert_eq!(square_shade(7, 7), SquareShade::Light); // h1
        let a1 = Square::from_algebraic("a1").unwrap();
        assert_eq!(a1.shade(), square_shade(a1.file(), a1.row()));
    }

    #[test]
    fn test_hit_test_with_padding() {
        let layout = BoardLayout::default();
        assert_eq!(layout.hit_test(5.0, 5.0, Orientation::Primary), None);
        assert_eq!(
            layout.hit_test(25.0, 25.0, Orientation::Primary),
            Square::from_algebraic("a8")
        );
        assert_eq!(
            layout.hit_test(25.0, 25.0, Orientation::Flipped),
            Square::from_algebraic("h1")
        );
        let e4 = Square::from_algebraic("e4").unwrap();
        let (cx, cy) = layout.square_center(e4, Orientation::Flipped);
        assert_eq!(layout.hit_test(cx, cy, Orientation::Flipped), Some(e4));
    }

    #[test]
    fn test_labels_follow_orientation() {
        assert_eq!(BoardLayout::file_labels(Orientation::Primary)[0], 'a');
        assert_eq!(BoardLayout::file_labels(Orientation::Flipped)[0], 'h');
        assert_eq!(BoardLayout::rank_labels(Orientation::Primary)[0], '8');
        assert_eq!(BoardLayout::rank_labels(Orientation::Flipped)[0], '1');
    }
}
