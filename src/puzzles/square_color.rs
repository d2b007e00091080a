//! Square colour quiz: name a square, the user answers light or dark.

use crate::domain::{Square, SquareShade};

/// Outcome of one answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorVerdict {
    Correct,
    Incorrect { square: Square, shade: SquareShade },
}

/// Parse an answer: "l"/"light" or "d"/"dark", any case
pub fn parse_shade(text: &str) -> Option<SquareShade> {
    match text.trim().to_ascii_lowercase().as_str() {
        "l" | "light" => Some(SquareShade::Light),
        "d" | "dark" => Some(SquareShade::Dark),
        _ => None,
    }
}

/// A running quiz with its tally
#[derive(Clone, Debug)]
pub struct ColorQuiz {
    square: Square,
    answered: bool,
    correct: u32,
    wrong: u32,
}

impl ColorQuiz {
    pub fn new(rng: &mut fastrand::Rng) -> Self {
        Self {
            square: random_square(rng, None),
            answered: false,
            correct: 0,
            wrong: 0,
        }
    }

    /// Square currently asked about
    pub fn square(&self) -> Square {
        self.square
    }

    /// Ask about a new square, never the one just shown
    pub fn next(&mut self, rng: &mut fastrand::Rng) -> Square {
        self.square = random_square(rng, Some(self.square));
        self.answered = false;
        self.square
    }

    /// Grade an answer. Only the first answer per square counts in the tally.
    pub fn answer(&mut self, shade: SquareShade) -> ColorVerdict {
        let actual = self.square.shade();
        let verdict = if shade == actual {
            ColorVerdict::Correct
        } else {
            ColorVerdict::Incorrect {
                square: self.square,
                shade: actual,
            }
        };
        if !self.answered {
            self.answered = true;
            match verdict {
                ColorVerdict::Correct => self.correct += 1,
                ColorVerdict::Incorrect { .. } => self.wrong += 1,
            }
        }
        verdict
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn wrong(&self) -> u32 {
        self.wrong
    }
}

/// Uniform random square, redrawn while it equals `avoid`
pub(crate) fn random_square(rng: &mut fastrand::Rng, avoid: Option<Square>) -> Square {
    loop {
        if let Some(square) = Square::from_board_index(rng.usize(..64)) {
            if Some(square) != avoid {
                return square;
            }
        }
    }
}
