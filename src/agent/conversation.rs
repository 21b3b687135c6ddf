//! Conversation history management
//!
//! An append-only sequence of messages. Once a message is appended it is
//! never mutated or removed; the sequence is the single source of truth for
//! a session's context.

use crate::core::{Message, Role, ToolCallRequest, ToolResult};

/// Append-only conversation history
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append an assistant answer
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Append an assistant message carrying tool-call requests
    pub fn push_assistant_calls(&mut self, content: impl Into<String>, calls: Vec<ToolCallRequest>) {
        self.messages.push(Message::assistant_with_calls(content, calls));
    }

    /// Append a tool result as a tool-role message
    pub fn push_tool_result(&mut self, result: ToolResult) {
        self.messages.push(Message::tool(result));
    }

    /// Get all messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Get the last assistant message
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
