//! Agent module - orchestration, sessions, and conversation management
//!
//! Contains the state machine that coordinates model calls and tool execution.

pub mod conversation;
pub mod orchestrator;
pub mod session;
pub mod turn;

pub use conversation::Conversation;
pub use orchestrator::Agent;
pub use session::{SessionStore, TurnGuard};
pub use turn::{TurnPhase, TurnState};
