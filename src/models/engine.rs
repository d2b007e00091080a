//! Engine session - drives the UCI exchange with a background engine.
//!
//! State moves only on replies:
//! `Uninitialized -> AwaitingHandshake` (initialize) `-> Ready` (first readyok)
//! `-> Computing` (go) `-> Ready` (bestmove).
//!
//! Readiness requests may overlap. Pending requests are resolved strictly in
//! the order they were sent, one per "readyok"; UCI engines answer in order.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::uci::{BestMove, UciCommand, UciOutputKind};
use crate::error::SessionError;
use crate::models::transport::{EngineEvent, EngineTransport};

/// Maximum number of output lines to keep in history
const MAX_OUTPUT_LINES: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    AwaitingHandshake,
    Ready,
    Computing,
}

/// Handle for one outstanding readiness request
#[derive(Debug)]
pub struct ReadyTicket {
    receiver: Receiver<()>,
    resolved: Cell<bool>,
}

impl ReadyTicket {
    fn new() -> (Sender<()>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                receiver: rx,
                resolved: Cell::new(false),
            },
        )
    }

    /// Whether the matching "readyok" has been processed
    pub fn is_resolved(&self) -> bool {
        if !self.resolved.get() && self.receiver.try_recv().is_ok() {
            self.resolved.set(true);
        }
        self.resolved.get()
    }
}

/// The engine session over some transport
pub struct EngineSession<T: EngineTransport> {
    transport: T,
    state: SessionState,
    search_depth: u32,
    options: Vec<(String, String)>,
    /// Resolvers for outstanding "isready" requests, oldest first
    pending_ready: VecDeque<Sender<()>>,
    /// Best moves received while blocked in `wait_ready`
    buffered_moves: VecDeque<String>,
    /// Set while a new game is being prepared; best moves are stale then
    discard_best_moves: bool,
    /// Whether a position statement went out since the last "go"
    position_pending: bool,
    last_position: Option<UciCommand>,
    output_lines: Vec<String>,
    exited: bool,
}

impl<T: EngineTransport> EngineSession<T> {
    pub fn new(transport: T, config: &EngineConfig) -> Self {
        Self {
            transport,
            state: SessionState::Uninitialized,
            search_depth: config.search_depth,
            options: config.options.clone(),
            pending_ready: VecDeque::new(),
            buffered_moves: VecDeque::new(),
            discard_best_moves: false,
            position_pending: false,
            last_position: None,
            output_lines: Vec::new(),
            exited: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_computing(&self) -> bool {
        self.state == SessionState::Computing
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn search_depth(&self) -> u32 {
        self.search_depth
    }

    pub fn set_search_depth(&mut self, depth: u32) {
        self.search_depth = depth;
    }

    /// Number of readiness requests still waiting for a reply
    pub fn pending_ready(&self) -> usize {
        self.pending_ready.len()
    }

    /// Most recently transmitted position statement
    pub fn last_position(&self) -> Option<&UciCommand> {
        self.last_position.as_ref()
    }

    /// Move list of the most recent position statement
    pub fn last_synced_moves(&self) -> Option<&[String]> {
        match &self.last_position {
            Some(UciCommand::Position { moves, .. }) => Some(moves),
            _ => None,
        }
    }

    /// Recent raw engine output, oldest first
    pub fn output_lines(&self) -> &[String] {
        &self.output_lines
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Start the handshake. The returned ticket resolves on the first "readyok".
    pub fn initialize(&mut self) -> Result<ReadyTicket, SessionError> {
        if self.state != SessionState::Uninitialized {
            return self.await_ready();
        }
        self.send_command(UciCommand::Uci)?;
        for (name, value) in self.options.clone() {
            self.send_command(UciCommand::set_option(&name, value))?;
        }
        self.state = SessionState::AwaitingHandshake;
        info!("engine handshake started");
        self.await_ready()
    }

    /// Send "isready" and queue a ticket for its reply
    pub fn await_ready(&mut self) -> Result<ReadyTicket, SessionError> {
        if self.state == SessionState::Uninitialized {
            return Err(SessionError::NotInitialized);
        }
        let (resolver, ticket) = ReadyTicket::new();
        self.send_command(UciCommand::IsReady)?;
        self.pending_ready.push_back(resolver);
        Ok(ticket)
    }

    /// Block until `ticket` resolves. No timeout: a hung engine blocks here,
    /// a closed channel ends the wait with `Disconnected`.
    pub fn wait_ready(&mut self, ticket: &ReadyTicket) -> Result<(), SessionError> {
        while !ticket.is_resolved() {
            match self.transport.recv() {
                Some(event) => self.handle_event(event),
                None => return Err(SessionError::Disconnected),
            }
        }
        Ok(())
    }

    /// Prepare the engine for a fresh game.
    ///
    /// Any best move that arrives before the readiness reply belongs to the
    /// superseded search and is discarded.
    pub fn reset_for_new_game(&mut self, skill_level: Option<u8>) -> Result<(), SessionError> {
        if self.state == SessionState::Uninitialized {
            return Err(SessionError::NotInitialized);
        }
        self.send_command(UciCommand::Stop)?;
        self.send_command(UciCommand::UciNewGame)?;
        self.send_command(UciCommand::button("Clear Hash"))?;
        if let Some(level) = skill_level {
            self.send_command(UciCommand::set_option("Skill Level", level))?;
        }

        self.buffered_moves.clear();
        self.discard_best_moves = true;
        let ticket = self.await_ready();
        let waited = ticket.and_then(|t| self.wait_ready(&t));
        self.discard_best_moves = false;
        waited?;

        if self.state == SessionState::Computing {
            warn!("engine never answered the stopped search");
            self.state = SessionState::Ready;
        }
        self.sync_moves(&[])?;
        info!(?skill_level, "engine reset for new game");
        Ok(())
    }

    /// Transmit the entire move history from the starting position
    pub fn sync_moves(&mut self, history: &[String]) -> Result<(), SessionError> {
        self.sync_position(None, history)
    }

    /// Transmit a custom starting position plus the moves played from it
    pub fn sync_position(&mut self, fen: Option<&str>, history: &[String]) -> Result<(), SessionError> {
        let cmd = UciCommand::Position {
            fen: fen.map(str::to_string),
            moves: history.to_vec(),
        };
        self.send_command(cmd.clone())?;
        self.last_position = Some(cmd);
        self.position_pending = true;
        Ok(())
    }

    /// Ask for a best move at the configured depth
    pub fn request_best_move(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Uninitialized => return Err(SessionError::NotInitialized),
            SessionState::Computing => return Err(SessionError::AlreadyComputing),
            _ => {}
        }
        if !self.position_pending {
            // every "go" needs a position statement in front of it
            let cmd = self
                .last_position
                .clone()
                .unwrap_or(UciCommand::Position {
                    fen: None,
                    moves: Vec::new(),
                });
            self.send_command(cmd.clone())?;
            self.last_position = Some(cmd);
        }
        self.send_command(UciCommand::GoDepth(self.search_depth))?;
        self.position_pending = false;
        self.state = SessionState::Computing;
        Ok(())
    }

    /// Stop the current search; the engine still answers with a best move
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.send_command(UciCommand::Stop)
    }

    pub fn quit(&mut self) -> Result<(), SessionError> {
        self.send_command(UciCommand::Quit)
    }

    /// Block for one engine event, then drain like `pump`
    pub fn pump_blocking(&mut self) -> Result<Vec<String>, SessionError> {
        match self.transport.recv() {
            Some(event) => self.handle_event(event),
            None => return Err(SessionError::Disconnected),
        }
        Ok(self.pump())
    }

    /// Drain available replies. Every best-move reply is returned exactly once.
    pub fn pump(&mut self) -> Vec<String> {
        while let Some(event) = self.transport.try_recv() {
            self.handle_event(event);
        }
        self.buffered_moves.drain(..).collect()
    }

    fn send_command(&mut self, cmd: UciCommand) -> Result<(), SessionError> {
        let line = cmd.to_uci_string();
        debug!(%line, "engine <");
        self.transport.send(&line)
    }

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Output(line) => self.handle_line(line),
            EngineEvent::Exited => {
                warn!("engine exited");
                self.exited = true;
                self.add_output("[Engine exited]".to_string());
            }
            EngineEvent::Error(e) => {
                warn!(error = %e, "engine I/O error");
                self.add_output(format!("[Error: {}]", e));
            }
        }
    }

    fn handle_line(&mut self, line: String) {
        debug!(%line, "engine >");
        match UciOutputKind::parse(&line) {
            UciOutputKind::ReadyOk => {
                match self.pending_ready.pop_front() {
                    Some(resolver) => {
                        let _ = resolver.send(());
                    }
                    None => warn!("readyok without a pending request"),
                }
                if self.state == SessionState::AwaitingHandshake {
                    self.state = SessionState::Ready;
                    info!("engine ready");
                }
            }
            UciOutputKind::BestMove(BestMove { mv, .. }) => {
                if self.state == SessionState::Computing {
                    self.state = SessionState::Ready;
                }
                if self.discard_best_moves {
                    debug!(?mv, "discarding best move from superseded search");
                } else {
                    match mv {
                        Some(mv) => self.buffered_moves.push_back(mv),
                        None => debug!("engine has no move"),
                    }
                }
            }
            _ => {}
        }
        self.add_output(line);
    }

    /// Add an output line, keeping only the most recent ones
    fn add_output(&mut self, line: String) {
        self.output_lines.push(line);
        if self.output_lines.len() > MAX_OUTPUT_LINES {
            let excess = self.output_lines.len() - MAX_OUTPUT_LINES;
            self.output_lines.drain(0..excess);
        }
    }
}
