//! Game orchestrator - keeps the position model and the engine session in step.
//!
//! Every applied move, whether typed by the user or reported by the engine,
//! goes through the same apply path, and the engine is always resynced with
//! the full history afterwards.

use std::collections::VecDeque;
use std::fmt;

use tracing::{error, info, warn};

use crate::domain::{
    Move, MoveOracle, Outcome, PieceColor, PlayedMove, PositionModel, RecordMetadata, export_pgn,
};
use crate::error::{GameError, GameResult, IllegalMoveError, SessionError};
use crate::models::engine::{EngineSession, SessionState};
use crate::models::transport::EngineTransport;
use crate::ui::{Orientation, render_board};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    AwaitingUser,
    AwaitingEngine,
    Finished,
}

/// Who played a move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mover {
    User,
    Engine,
}

/// Events queued for the user interface
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    GameStarted {
        user_side: PieceColor,
        skill_level: u8,
    },
    MoveApplied {
        by: Mover,
        color: PieceColor,
        coordinate: String,
        san: String,
    },
    GameOver {
        outcome: Outcome,
    },
    /// The engine reported a move that does not fit the live position
    ProtocolDesync {
        reported: String,
        reason: String,
    },
    /// The engine stopped answering; a new game is needed
    EngineLost {
        reason: String,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::GameStarted {
                user_side,
                skill_level,
            } => write!(f, "New game: you play {} (skill level {})", user_side, skill_level),
            Notification::MoveApplied { by, san, .. } => match by {
                Mover::User => write!(f, "You played {}", san),
                Mover::Engine => write!(f, "Engine played {}", san),
            },
            Notification::GameOver { outcome } => write!(f, "{}", outcome.message()),
            Notification::ProtocolDesync { reported, reason } => write!(
                f,
                "Engine reported {} ({}); start a new game",
                reported, reason
            ),
            Notification::EngineLost { reason } => {
                write!(f, "Engine unavailable: {}; start a new game", reason)
            }
        }
    }
}

/// A game of the user against the engine
pub struct GameOrchestrator<O: MoveOracle, T: EngineTransport> {
    position: PositionModel<O>,
    session: EngineSession<T>,
    phase: GamePhase,
    user_side: PieceColor,
    skill_level: u8,
    notifications: VecDeque<Notification>,
}

impl<O: MoveOracle, T: EngineTransport> GameOrchestrator<O, T> {
    pub fn new(oracle: O, session: EngineSession<T>) -> Self {
        Self {
            position: PositionModel::new(oracle),
            session,
            phase: GamePhase::NotStarted,
            user_side: PieceColor::White,
            skill_level: 0,
            notifications: VecDeque::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn user_side(&self) -> PieceColor {
        self.user_side
    }

    pub fn skill_level(&self) -> u8 {
        self.skill_level
    }

    pub fn position(&self) -> &PositionModel<O> {
        &self.position
    }

    pub fn history(&self) -> &[PlayedMove] {
        self.position.history()
    }

    pub fn session(&self) -> &EngineSession<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EngineSession<T> {
        &mut self.session
    }

    /// Take every queued notification, oldest first
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    /// Start a new game with the user playing `side`
    pub fn start(&mut self, side: PieceColor, skill_level: u8) -> GameResult<()> {
        self.position.reset();
        self.user_side = side;
        self.skill_level = skill_level;
        self.notifications.clear();
        self.phase = GamePhase::NotStarted;

        if let Err(e) = self.prepare_engine(skill_level) {
            self.lose_engine(&e);
            return Err(e.into());
        }
        self.notify(Notification::GameStarted {
            user_side: side,
            skill_level,
        });
        info!(?side, skill_level, "game started");

        if side == PieceColor::White {
            self.phase = GamePhase::AwaitingUser;
        } else {
            // the reset already transmitted the empty history
            self.session.request_best_move()?;
            self.phase = GamePhase::AwaitingEngine;
        }
        Ok(())
    }

    fn prepare_engine(&mut self, skill_level: u8) -> Result<(), SessionError> {
        if self.session.state() == SessionState::Uninitialized {
            let ticket = self.session.initialize()?;
            self.session.wait_ready(&ticket)?;
        }
        self.session.reset_for_new_game(Some(skill_level))
    }

    /// Parse, validate and play the user's move, then hand the turn to the engine
    pub fn submit_user_move(&mut self, text: &str) -> GameResult<PlayedMove> {
        match self.phase {
            GamePhase::NotStarted | GamePhase::Finished => return Err(GameError::NotStarted),
            GamePhase::AwaitingEngine => return Err(GameError::NotYourTurn),
            GamePhase::AwaitingUser => {}
        }

        let mv = self.position.parse_move(text)?;
        let played = self.play(&mv, Mover::User)?;

        let result = self.sync_history().and_then(|_| {
            if self.phase == GamePhase::Finished {
                Ok(())
            } else {
                self.session.request_best_move()
            }
        });
        match result {
            Ok(()) => {
                if self.phase != GamePhase::Finished {
                    self.phase = GamePhase::AwaitingEngine;
                }
                Ok(played)
            }
            Err(e) => {
                self.lose_engine(&e);
                Err(e.into())
            }
        }
    }

    /// Apply any best moves the engine has reported since the last poll
    pub fn poll_engine(&mut self) -> Vec<PlayedMove> {
        let moves = self.session.pump();
        let applied = self.handle_best_moves(moves);
        if self.phase == GamePhase::AwaitingEngine && self.session.has_exited() {
            self.lose_engine(&SessionError::Disconnected);
        }
        applied
    }

    /// Block until the engine has answered the pending request
    pub fn wait_for_engine(&mut self) -> GameResult<Vec<PlayedMove>> {
        let mut applied = self.poll_engine();
        while self.phase == GamePhase::AwaitingEngine {
            match self.session.pump_blocking() {
                Ok(moves) => applied.extend(self.handle_best_moves(moves)),
                Err(e) => {
                    self.lose_engine(&e);
                    return Err(e.into());
                }
            }
        }
        Ok(applied)
    }

    /// PGN of the game so far
    pub fn export_record(&self) -> String {
        let meta = RecordMetadata::for_engine_game(self.user_side, self.skill_level);
        self.export_record_with(&meta)
    }

    pub fn export_record_with(&self, meta: &RecordMetadata) -> String {
        export_pgn(meta, self.position.history(), self.position.outcome())
    }

    /// Text board of the live position, last move marked
    pub fn peek(&self, orientation: Orientation) -> GameResult<String> {
        let board = self.position.board()?;
        let last = self.position.last_move().map(|p| &p.mv);
        Ok(render_board(&board, orientation, last))
    }

    fn handle_best_moves(&mut self, moves: Vec<String>) -> Vec<PlayedMove> {
        let mut applied = Vec::new();
        for reported in moves {
            if self.phase != GamePhase::AwaitingEngine {
                warn!(%reported, phase = ?self.phase, "ignoring best move outside the engine's turn");
                continue;
            }
            if let Some(played) = self.apply_engine_move(&reported) {
                applied.push(played);
            }
        }
        applied
    }

    fn apply_engine_move(&mut self, reported: &str) -> Option<PlayedMove> {
        let played = match self.position.parse_move(reported) {
            Ok(mv) => self.play(&mv, Mover::Engine).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let played = match played {
            Ok(played) => played,
            Err(reason) => {
                let desync = GameError::ProtocolDesync {
                    reported: reported.to_string(),
                    reason: reason.clone(),
                };
                error!(error = %desync, "engine and game out of step");
                self.notify(Notification::ProtocolDesync {
                    reported: reported.to_string(),
                    reason,
                });
                self.phase = GamePhase::Finished;
                return None;
            }
        };

        if let Err(e) = self.sync_history() {
            self.lose_engine(&e);
            return Some(played);
        }
        if self.phase != GamePhase::Finished {
            self.phase = GamePhase::AwaitingUser;
        }
        Some(played)
    }

    /// The single apply path for user and engine moves
    fn play(&mut self, mv: &Move, by: Mover) -> Result<PlayedMove, IllegalMoveError> {
        let played = self.position.apply_move(mv)?.clone();
        self.notify(Notification::MoveApplied {
            by,
            color: played.color,
            coordinate: played.coordinate(),
            san: played.san.clone(),
        });
        if let Some(outcome) = self.position.outcome() {
            info!(result = outcome.result_token(), "game over");
            self.notify(Notification::GameOver { outcome });
            self.phase = GamePhase::Finished;
        }
        Ok(played)
    }

    fn sync_history(&mut self) -> Result<(), SessionError> {
        let moves = self.position.coordinate_history();
        self.session.sync_moves(&moves)
    }

    fn lose_engine(&mut self, err: &SessionError) {
        error!(error = %err, "engine session failed");
        self.notify(Notification::EngineLost {
            reason: err.to_string(),
        });
        self.phase = GamePhase::Finished;
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::ShakmatyOracle;
    use crate::models::transport::ScriptedTransport;

    fn game_with(moves: &[&str]) -> GameOrchestrator<ShakmatyOracle, ScriptedTransport> {
        let transport = ScriptedTransport::new().with_moves(moves.iter().copied());
        let session = EngineSession::new(transport, &EngineConfig::default());
        GameOrchestrator::new(ShakmatyOracle::new(), session)
    }

    fn synced(game: &GameOrchestrator<ShakmatyOracle, ScriptedTransport>) -> Vec<String> {
        game.session()
            .last_synced_moves()
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    #[test]
    fn test_user_move_from_start() {
        let mut game = game_with(&[]);
        game.start(PieceColor::White, 5).unwrap();
        assert_eq!(game.phase(), GamePhase::AwaitingUser);
        game.drain_notifications();

        let played = game.submit_user_move("e2e4").unwrap();
        assert_eq!(played.san, "e4");
        assert_eq!(game.phase(), GamePhase::AwaitingEngine);
        assert_eq!(synced(&game), vec!["e2e4"]);
        assert_eq!(
            game.drain_notifications(),
            vec![Notification::MoveApplied {
                by: Mover::User,
                color: PieceColor::White,
                coordinate: "e2e4".to_string(),
                san: "e4".to_string(),
            }]
        );
        let sent = game.session().transport().sent();
        assert_eq!(sent[sent.len() - 2], "position startpos moves e2e4");
        assert_eq!(sent[sent.len() - 1], "go depth 15");
    }

    #[test]
    fn test_engine_reply_resyncs_history() {
        let mut game = game_with(&["e7e5"]);
        game.start(PieceColor::White, 5).unwrap();
        game.submit_user_move("e4").unwrap();

        let applied = game.poll_engine();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].san, "e5");
        assert_eq!(game.phase(), GamePhase::AwaitingUser);
        assert_eq!(synced(&game), game.position().coordinate_history());
        assert_eq!(
            game.session().transport().last_position(),
            Some("position startpos moves e2e4 e7e5")
        );
    }

    #[test]
    fn test_user_plays_black() {
        let mut game = game_with(&["d2d4"]);
        game.start(PieceColor::Black, 3).unwrap();
        assert_eq!(game.phase(), GamePhase::AwaitingEngine);
        assert!(matches!(
            game.submit_user_move("d5"),
            Err(GameError::NotYourTurn)
        ));

        game.wait_for_engine().unwrap();
        assert_eq!(game.phase(), GamePhase::AwaitingUser);
        game.submit_user_move("d7d5").unwrap();
        assert_eq!(synced(&game), vec!["d2d4", "d7d5"]);
        assert!(
            game.session()
                .transport()
                .sent()
                .contains(&"setoption name Skill Level value 3".to_string())
        );
    }

    #[test]
    fn test_rejected_input_changes_nothing() {
        let mut game = game_with(&[]);
        assert!(matches!(
            game.submit_user_move("e4"),
            Err(GameError::NotStarted)
        ));

        game.start(PieceColor::White, 5).unwrap();
        let sent_before = game.session().transport().sent().len();
        assert!(matches!(
            game.submit_user_move("hello"),
            Err(GameError::InputFormat { .. })
        ));
        assert!(matches!(
            game.submit_user_move("e2e5"),
            Err(GameError::IllegalMove(_))
        ));
        assert!(game.history().is_empty());
        assert_eq!(game.phase(), GamePhase::AwaitingUser);
        assert_eq!(game.session().transport().sent().len(), sent_before);
    }

    #[test]
    fn test_engine_desync_finishes_game() {
        let mut game = game_with(&["e2e5"]);
        game.start(PieceColor::White, 5).unwrap();
        game.submit_user_move("d4").unwrap();
        game.drain_notifications();

        assert!(game.poll_engine().is_empty());
        assert_eq!(game.phase(), GamePhase::Finished);
        assert_eq!(game.history().len(), 1);
        let notes = game.drain_notifications();
        assert!(matches!(
            notes.as_slice(),
            [Notification::ProtocolDesync { reported, .. }] if reported == "e2e5"
        ));
        assert!(matches!(
            game.submit_user_move("c4"),
            Err(GameError::NotStarted)
        ));

        // an explicit new game recovers
        game.start(PieceColor::White, 5).unwrap();
        assert_eq!(game.phase(), GamePhase::AwaitingUser);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_stray_best_move_ignored() {
        let mut game = game_with(&[]);
        game.start(PieceColor::White, 5).unwrap();
        game.session_mut().transport_mut().push_line("bestmove e7e5");
        assert!(game.poll_engine().is_empty());
        assert_eq!(game.phase(), GamePhase::AwaitingUser);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_engine_delivers_mate() {
        let mut game = game_with(&["e7e5", "d8h4"]);
        game.start(PieceColor::White, 5).unwrap();
        game.submit_user_move("f3").unwrap();
        game.wait_for_engine().unwrap();
        game.submit_user_move("g2g4").unwrap();
        game.wait_for_engine().unwrap();

        assert_eq!(game.phase(), GamePhase::Finished);
        let outcome = Outcome::Checkmate {
            winner: PieceColor::Black,
        };
        assert!(game.drain_notifications().contains(&Notification::GameOver { outcome }));
        assert_eq!(synced(&game), vec!["f2f3", "e7e5", "g2g4", "d8h4"]);

        let pgn = game.export_record();
        assert!(pgn.contains("[White \"You\"]"));
        assert!(pgn.ends_with("1. f3 e5 2. g4 Qh4# 0-1\n"));
    }

    #[test]
    fn test_disconnect_while_waiting() {
        let mut game = game_with(&[]);
        game.start(PieceColor::White, 5).unwrap();
        game.submit_user_move("e4").unwrap();

        // the scripted engine has nothing left to say
        assert!(matches!(
            game.wait_for_engine(),
            Err(GameError::Session(SessionError::Disconnected))
        ));
        assert_eq!(game.phase(), GamePhase::Finished);
        assert!(matches!(
            game.drain_notifications().last(),
            Some(Notification::EngineLost { .. })
        ));
    }

    #[test]
    fn test_peek() {
        let mut game = game_with(&[]);
        game.start(PieceColor::White, 5).unwrap();
        game.submit_user_move("e4").unwrap();
        let text = game.peek(Orientation::Primary).unwrap();
        assert!(text.contains("4  .  .  .  . [P] .  .  . "));
    }

    #[test]
    fn test_failed_engine_reset_clears_previous_game() {
        let mut game = game_with(&["e7e5"]);
        game.start(PieceColor::White, 5).unwrap();
        game.submit_user_move("e4").unwrap();
        game.poll_engine();
        assert_eq!(game.history().len(), 2);

        game.session_mut().transport_mut().auto_ready = false;
        assert!(matches!(
            game.start(PieceColor::White, 5),
            Err(GameError::Session(SessionError::Disconnected))
        ));
        assert!(game.history().is_empty());
        assert_eq!(game.phase(), GamePhase::Finished);
        assert!(matches!(
            game.drain_notifications().last(),
            Some(Notification::EngineLost { .. })
        ));
    }

    #[test]
    fn test_repetition_finishes_game() {
        let mut game = game_with(&["g8f6", "f6g8", "g8f6", "f6g8"]);
        game.start(PieceColor::White, 5).unwrap();
        for mv in ["Nf3", "Ng1", "Nf3"] {
            game.submit_user_move(mv).unwrap();
            game.poll_engine();
        }
        game.submit_user_move("Ng1").unwrap();
        assert_eq!(game.phase(), GamePhase::AwaitingEngine);
        game.poll_engine();

        assert_eq!(game.history().len(), 8);
        assert_eq!(game.phase(), GamePhase::Finished);
        assert_eq!(game.position().outcome(), Some(Outcome::Draw));
        assert!(
            game.drain_notifications()
                .contains(&Notification::GameOver { outcome: Outcome::Draw })
        );
        assert!(matches!(
            game.submit_user_move("Nf3"),
            Err(GameError::NotStarted)
        ));
    }
}
