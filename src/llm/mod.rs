//! LLM module - model adapter abstraction
//!
//! Provides the adapter contract plus the production Gemini implementation.

pub mod gemini;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::{CompletionOptions, ModelAdapter, ModelResponse, StreamCallback, TokenUsage};
