//! View models for text output.
//!
//! Display-ready DTOs built from the game history. They live in the UI layer,
//! not the domain layer.

/// One numbered line of the move list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRowDisplay {
    pub move_num: usize,
    /// `None` when the game started with black to move
    pub white: Option<String>,
    pub black: Option<String>,
}

impl MoveRowDisplay {
    pub fn to_line(&self) -> String {
        let white = self.white.as_deref().unwrap_or("...");
        match &self.black {
            Some(black) => format!("{}. {} {}", self.move_num, white, black),
            None => format!("{}. {}", self.move_num, white),
        }
    }
}
