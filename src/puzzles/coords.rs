//! Coordinate tap trainer: a square is named, the user taps it on an
//! unlabelled board. Taps are hit-tested against the current orientation.

use std::fmt;

use crate::domain::Square;
use crate::puzzles::square_color::random_square;
use crate::ui::{BoardLayout, Orientation};

/// Result of one tap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapVerdict {
    Correct { square: Square },
    Wrong { tapped: Square, wanted: Square },
}

/// Tally of a finished round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub correct: u32,
    pub wrong: u32,
}

impl RoundSummary {
    pub fn total(&self) -> u32 {
        self.correct + self.wrong
    }

    /// Rounded share of correct taps, `None` without attempts
    pub fn percent(&self) -> Option<u32> {
        let total = self.total();
        (total > 0).then(|| (self.correct * 100 + total / 2) / total)
    }
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(percent) => write!(
                f,
                "Round over: {} correct, {} wrong ({}%).",
                self.correct, self.wrong, percent
            ),
            None => write!(f, "Round over: no attempts."),
        }
    }
}

pub struct CoordTrainer {
    layout: BoardLayout,
    orientation: Orientation,
    /// Square to tap; `None` between rounds
    target: Option<Square>,
    previous: Option<Square>,
    correct: u32,
    wrong: u32,
}

impl CoordTrainer {
    pub fn new(layout: BoardLayout, orientation: Orientation) -> Self {
        Self {
            layout,
            orientation,
            target: None,
            previous: None,
            correct: 0,
            wrong: 0,
        }
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn target(&self) -> Option<Square> {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.target.is_some()
    }

    /// Clear the tally and pick the first target
    pub fn start_round(&mut self, rng: &mut fastrand::Rng) -> Square {
        self.correct = 0;
        self.wrong = 0;
        self.pick_target(rng)
    }

    /// Stop the round and report the tally
    pub fn end_round(&mut self) -> RoundSummary {
        self.target = None;
        self.summary()
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            correct: self.correct,
            wrong: self.wrong,
        }
    }

    /// Judge a tap at panel pixel `x`, `y`, then move on to a new target.
    ///
    /// Taps outside the board, or while no round runs, are ignored.
    pub fn tap(&mut self, x: f32, y: f32, rng: &mut fastrand::Rng) -> Option<TapVerdict> {
        let wanted = self.target?;
        let tapped = self.layout.hit_test(x, y, self.orientation)?;
        let verdict = if tapped == wanted {
            self.correct += 1;
            TapVerdict::Correct { square: tapped }
        } else {
            self.wrong += 1;
            TapVerdict::Wrong { tapped, wanted }
        };
        self.pick_target(rng);
        Some(verdict)
    }

    /// Tap the center of the on-screen cell at `col`, `line` (0-based from the
    /// top-left corner of the board)
    pub fn tap_cell(&mut self, col: u8, line: u8, rng: &mut fastrand::Rng) -> Option<TapVerdict> {
        if col > 7 || line > 7 {
            return None;
        }
        let square_size = self.layout.square_size();
        let x = self.layout.padding + (f32::from(col) + 0.5) * square_size;
        let y = self.layout.padding + (f32::from(line) + 0.5) * square_size;
        self.tap(x, y, rng)
    }

    fn pick_target(&mut self, rng: &mut fastrand::Rng) -> Square {
        let next = random_square(rng, self.previous);
        self.previous = Some(next);
        self.target = Some(next);
        next
    }
}
