//! Turn state machine
//!
//! Tracks one turn's progress through its phases and enforces the think/act
//! iteration bound. The turn works on a staged copy of the conversation;
//! the orchestrator commits it to the session store only when the turn
//! completes with an answer.

use crate::agent::conversation::Conversation;
use crate::core::{ToolCallRequest, ToolResult};

/// Phase of the orchestration state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Between turns; also the terminal phase once an answer is produced
    AwaitingInput,
    /// A model completion is in flight or due
    Thinking,
    /// Requested tools are executing
    ExecutingTools,
}

/// State of one turn through the think/act loop
#[derive(Debug)]
pub struct TurnState {
    /// Current phase
    pub phase: TurnPhase,
    /// Completed think/act cycles
    pub step: usize,
    /// Maximum think/act cycles before the turn fails
    pub max_steps: usize,
    /// Working copy of the conversation, committed on success
    staged: Conversation,
    /// Final answer once the model stops requesting tools
    answer: Option<String>,
}

impl TurnState {
    /// Begin a turn: stage the user message on top of the session history
    pub fn begin(history: Conversation, user_message: impl Into<String>, max_steps: usize) -> Self {
        let mut staged = history;
        staged.push_user(user_message);

        Self {
            phase: TurnPhase::Thinking,
            step: 0,
            max_steps,
            staged,
            answer: None,
        }
    }

    /// Whether the model should be invoked (again)
    pub fn should_continue(&self) -> bool {
        self.phase == TurnPhase::Thinking && self.answer.is_none() && self.step < self.max_steps
    }

    /// The model produced a plain answer: append it and end the turn
    pub fn on_answer(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.staged.push_assistant(text.clone());
        self.answer = Some(text);
        self.phase = TurnPhase::AwaitingInput;
    }

    /// The model requested tool calls: append the assistant message and
    /// move to tool execution
    pub fn on_tool_calls(&mut self, content: impl Into<String>, calls: Vec<ToolCallRequest>) {
        self.staged.push_assistant_calls(content, calls);
        self.phase = TurnPhase::ExecutingTools;
    }

    /// All requested tools produced a result: append each in request order
    /// and hand control back to the model
    pub fn on_tool_results(&mut self, results: Vec<ToolResult>) {
        for result in results {
            self.staged.push_tool_result(result);
        }
        self.step += 1;
        self.phase = TurnPhase::Thinking;
    }

    /// The staged conversation as the model should see it
    pub fn staged(&self) -> &Conversation {
        &self.staged
    }

    /// Consume the turn, yielding the answer and the conversation to commit.
    /// Returns `None` if the turn never reached an answer.
    pub fn finish(self) -> Option<(String, Conversation)> {
        let answer = self.answer?;
        Some((answer, self.staged))
    }
}
