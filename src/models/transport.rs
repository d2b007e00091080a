//! Engine transports - the line channel underneath the engine session.
//!
//! Architecture:
//! - `ProcessTransport` spawns the engine; I/O runs on OS threads (reader/writer)
//!   that talk to the session only through channels
//! - `MemoryTransport` is an in-process channel pair, for embedding an engine
//!   that lives on another thread
//! - `ScriptedTransport` is a deterministic fake engine

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, warn};

use crate::error::SessionError;

/// Messages sent from the engine side to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A line of output from the engine
    Output(String),
    /// Engine process exited
    Exited,
    /// Error occurred
    Error(String),
}

/// A bidirectional line channel to a UCI engine
pub trait EngineTransport {
    /// Queue one command line for the engine
    fn send(&mut self, line: &str) -> Result<(), SessionError>;

    /// Next event if one is already available
    fn try_recv(&mut self) -> Option<EngineEvent>;

    /// Block until the next event; `None` once the channel is closed
    fn recv(&mut self) -> Option<EngineEvent>;
}

/// A spawned engine process talking over stdin/stdout
pub struct ProcessTransport {
    command_sender: Sender<String>,
    event_receiver: Receiver<EngineEvent>,
    process: Child,
}

impl ProcessTransport {
    /// Spawn the engine at `path`
    pub fn spawn(path: &str) -> Result<Self, SessionError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().ok_or(SessionError::Disconnected)?;
        let stdout = child.stdout.take().ok_or(SessionError::Disconnected)?;

        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<String>();

        // Reader thread (OS thread for blocking I/O)
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        if event_tx.send(EngineEvent::Output(text)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = event_tx.send(EngineEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            let _ = event_tx.send(EngineEvent::Exited);
        });

        // Writer thread (OS thread for blocking I/O)
        thread::spawn(move || {
            let mut writer = stdin;
            while let Ok(cmd) = cmd_rx.recv() {
                if writeln!(writer, "{}", cmd).is_err() {
                    break;
                }
                if writer.flush().is_err() {
                    break;
                }
            }
        });

        debug!(path, "engine process spawned");
        Ok(Self {
            command_sender: cmd_tx,
            event_receiver: event_rx,
            process: child,
        })
    }
}

impl EngineTransport for ProcessTransport {
    fn send(&mut self, line: &str) -> Result<(), SessionError> {
        self.command_sender
            .send(line.to_string())
            .map_err(|_| SessionError::Disconnected)
    }

    fn try_recv(&mut self) -> Option<EngineEvent> {
        self.event_receiver.try_recv().ok()
    }

    fn recv(&mut self) -> Option<EngineEvent> {
        self.event_receiver.recv().ok()
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        let _ = self.command_sender.send("quit".to_string());
        if let Err(e) = self.process.kill() {
            debug!(error = %e, "engine already gone");
        }
        let _ = self.process.wait();
    }
}

/// The far end of a `MemoryTransport`: read the session's commands, write replies
pub struct MemoryEndpoint {
    pub commands: Receiver<String>,
    pub events: Sender<EngineEvent>,
}

impl MemoryEndpoint {
    /// Send one line of engine output
    pub fn reply(&self, line: &str) -> bool {
        self.events.send(EngineEvent::Output(line.to_string())).is_ok()
    }

    /// Every command sent so far that has not been read yet
    pub fn drain_commands(&self) -> Vec<String> {
        self.commands.try_iter().collect()
    }
}

/// In-process transport over a pair of channels
pub struct MemoryTransport {
    command_sender: Sender<String>,
    event_receiver: Receiver<EngineEvent>,
}

impl MemoryTransport {
    pub fn pair() -> (Self, MemoryEndpoint) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        (
            Self {
                command_sender: cmd_tx,
                event_receiver: event_rx,
            },
            MemoryEndpoint {
                commands: cmd_rx,
                events: event_tx,
            },
        )
    }
}

impl EngineTransport for MemoryTransport {
    fn send(&mut self, line: &str) -> Result<(), SessionError> {
        self.command_sender
            .send(line.to_string())
            .map_err(|_| SessionError::Disconnected)
    }

    fn try_recv(&mut self) -> Option<EngineEvent> {
        self.event_receiver.try_recv().ok()
    }

    fn recv(&mut self) -> Option<EngineEvent> {
        self.event_receiver.recv().ok()
    }
}

/// A fake engine that answers from a script.
///
/// "isready" is answered with "readyok", "uci" with "uciok", and every
/// "go" pops the next scripted best move. Replies are queued in send order.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    sent: Vec<String>,
    inbox: VecDeque<EngineEvent>,
    moves: VecDeque<String>,
    /// When false, "isready" is recorded but not answered
    pub auto_ready: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            auto_ready: true,
            ..Self::default()
        }
    }

    /// Script the replies to the next "go" commands, in order
    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves.extend(moves.into_iter().map(Into::into));
        self
    }

    pub fn push_move(&mut self, mv: &str) {
        self.moves.push_back(mv.to_string());
    }

    /// Queue an arbitrary engine line
    pub fn push_line(&mut self, line: &str) {
        self.inbox.push_back(EngineEvent::Output(line.to_string()));
    }

    /// Every command the session has sent, in order
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// Last "position" command sent, if any
    pub fn last_position(&self) -> Option<&str> {
        self.sent
            .iter()
            .rev()
            .find(|c| c.starts_with("position "))
            .map(String::as_str)
    }
}

impl EngineTransport for ScriptedTransport {
    fn send(&mut self, line: &str) -> Result<(), SessionError> {
        self.sent.push(line.to_string());
        match line {
            "uci" => self.push_line("uciok"),
            "isready" if self.auto_ready => self.push_line("readyok"),
            _ if line.starts_with("go") => match self.moves.pop_front() {
                Some(mv) => self.push_line(&format!("bestmove {}", mv)),
                None => warn!("scripted engine has no move left"),
            },
            _ => {}
        }
        Ok(())
    }

    fn try_recv(&mut self) -> Option<EngineEvent> {
        self.inbox.pop_front()
    }

    fn recv(&mut self) -> Option<EngineEvent> {
        // Nothing else can ever arrive, so an empty inbox means closed
        self.inbox.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_transport_round_trip() {
        let (mut transport, endpoint) = MemoryTransport::pair();
        transport.send("isready").unwrap();
        assert_eq!(endpoint.drain_commands(), vec!["isready"]);

        assert!(transport.try_recv().is_none());
        assert!(endpoint.reply("readyok"));
        assert_eq!(
            transport.recv(),
            Some(EngineEvent::Output("readyok".to_string()))
        );
    }

    #[test]
    fn test_memory_transport_disconnect() {
        let (mut transport, endpoint) = MemoryTransport::pair();
        drop(endpoint);
        assert!(matches!(
            transport.send("uci"),
            Err(SessionError::Disconnected)
        ));
        assert_eq!(transport.recv(), None);
    }

    #[test]
    fn test_scripted_answers_in_order() {
        let mut engine = ScriptedTransport::new().with_moves(["e7e5"]);
        engine.send("uci").unwrap();
        engine.send("isready").unwrap();
        engine.send("position startpos moves e2e4").unwrap();
        engine.send("go depth 15").unwrap();

        let lines: Vec<_> = std::iter::from_fn(|| engine.try_recv()).collect();
        assert_eq!(
            lines,
            vec![
                EngineEvent::Output("uciok".to_string()),
                EngineEvent::Output("readyok".to_string()),
                EngineEvent::Output("bestmove e7e5".to_string()),
            ]
        );
        assert_eq!(engine.last_position(), Some("position startpos moves e2e4"));
    }

    #[test]
    fn test_scripted_withheld_ready() {
        let mut engine = ScriptedTransport::new();
        engine.auto_ready = false;
        engine.send("isready").unwrap();
        assert_eq!(engine.try_recv(), None);
        assert_eq!(engine.sent(), &["isready".to_string()]);
    }
}
