//! Savant - Conversational Research Assistant Agent
//!
//! A think/act orchestration core: user messages are routed through a
//! language model, the tool calls it requests are executed against a
//! registry of externally supplied capabilities, and results are fed back
//! until a final answer is ready. Conversation state is kept per session.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model adapter abstraction with a Gemini implementation
//! - **Tools**: Capability trait, registry, and executor
//! - **Agent**: Orchestration state machine, sessions, and conversations
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use savant::agent::Agent;
//! use savant::core::Config;
//! use savant::llm::GeminiClient;
//! use savant::tools::ToolRegistry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let model = Arc::new(GeminiClient::from_config(&config).unwrap());
//!
//!     // Capabilities (image analysis, Wikipedia lookup, ...) are registered
//!     // by the embedding program; the core only routes calls to them.
//!     let registry = ToolRegistry::new();
//!
//!     let agent = Agent::new(config, model, registry);
//!     let answer = agent
//!         .submit_turn("session-1", "What is the Eiffel Tower?", None)
//!         .await
//!         .unwrap();
//!     println!("{}", answer);
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::Agent;
pub use cli::Repl;
pub use core::{Config, Result, SavantError};
