//! Model adapter trait for abstracting different backends
//!
//! Enables swapping the production Gemini client for stubs in tests or for
//! other backends entirely.

use async_trait::async_trait;

use crate::core::{Message, Result, ToolCallRequest, ToolDescriptor};

/// Response from a model adapter
///
/// Carries answer text and the tool calls the model wants to make. An empty
/// `tool_calls` list means the content is the final answer for this turn.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// Text content of the response
    pub content: String,
    /// Tool calls the model requested
    pub tool_calls: Vec<ToolCallRequest>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl ModelResponse {
    /// Whether this response requests tool execution
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for a completion call
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Temperature for sampling
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Callback function for streaming tokens
pub type StreamCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Trait for model adapters
///
/// The conversation is handed over in full on every call; adapters hold no
/// conversation state of their own.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Run one completion over the conversation with the given system
    /// instruction and tool descriptors
    async fn complete(
        &self,
        system_instruction: &str,
        tools: &[ToolDescriptor],
        conversation: &[Message],
        options: Option<CompletionOptions>,
    ) -> Result<ModelResponse>;

    /// Run one completion, streaming answer tokens through a callback.
    /// Tool-call requests are never streamed; they arrive in the returned
    /// response as with [`ModelAdapter::complete`].
    async fn complete_stream(
        &self,
        system_instruction: &str,
        tools: &[ToolDescriptor],
        conversation: &[Message],
        options: Option<CompletionOptions>,
        on_token: StreamCallback,
    ) -> Result<ModelResponse>;

    /// Get the adapter name
    fn name(&self) -> &str;
}
