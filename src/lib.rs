//! Blindfold chess trainer core.
//!
//! - `domain`: chess types, FEN, the Move Oracle seam, position model, PGN, UCI
//! - `models`: engine transports, the engine session and the game orchestrator
//! - `puzzles`: knight/bishop shortest paths and mate puzzles
//! - `ui`: square/pixel transform and text rendering

pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod prefs;
pub mod puzzles;
pub mod ui;

pub use config::TrainerConfig;
pub use error::{GameError, GameResult, SessionError};
