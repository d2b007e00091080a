//! Application layer: the engine session, its transports and the game orchestrator.

pub mod engine;
pub mod game;
pub mod transport;

pub use engine::{EngineSession, ReadyTicket, SessionState};
pub use game::{GameOrchestrator, GamePhase, Mover, Notification};
pub use transport::{EngineEvent, EngineTransport, MemoryEndpoint, MemoryTransport, ProcessTransport, ScriptedTransport};
