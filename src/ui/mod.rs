//! Presentation helpers: the square/pixel transform and text rendering.

pub mod board_layout;
pub mod display;
pub mod view_models;

pub use board_layout::{BoardLayout, Orientation, pixel_to_square, square_shade, square_to_pixel};
pub use display::{render_board, render_move_list};
