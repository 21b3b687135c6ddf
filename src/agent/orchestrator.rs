//! Agent orchestrator
//!
//! Drives the think/act loop for one turn: the model is invoked over the
//! session's history, requested tools are executed, and their results are fed
//! back until the model produces a plain answer or the iteration bound is hit.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::agent::conversation::Conversation;
use crate::agent::session::SessionStore;
use crate::agent::turn::TurnState;
use crate::core::{Config, Result, SavantError, ToolDescriptor};
use crate::llm::{CompletionOptions, ModelAdapter, ModelResponse, StreamCallback};
use crate::tools::{ToolExecutor, ToolRegistry};

/// Main agent that orchestrates the model and tools across sessions
pub struct Agent {
    /// Configuration
    config: Config,
    /// Model adapter
    model: Arc<dyn ModelAdapter>,
    /// Tool registry, read-only after startup
    registry: Arc<ToolRegistry>,
    /// Descriptor snapshot handed to every model call
    descriptors: Vec<ToolDescriptor>,
    /// Tool executor
    executor: ToolExecutor,
    /// Per-session conversation state
    sessions: SessionStore,
}

impl Agent {
    /// Create an agent over a model adapter and a registry of capabilities
    pub fn new(config: Config, model: Arc<dyn ModelAdapter>, registry: ToolRegistry) -> Self {
        let registry = Arc::new(registry);
        let executor = ToolExecutor::new(registry.clone(), config.tools.timeout_secs);
        let descriptors = registry.descriptors();

        Self {
            config,
            model,
            registry,
            descriptors,
            executor,
            sessions: SessionStore::new(),
        }
    }

    /// Process one user message for a session and return the final answer
    ///
    /// An attachment path, when present, is combined with the text into a
    /// single user message; tool routing decides whether and how to use it.
    pub async fn submit_turn(
        &self,
        session_key: &str,
        user_text: &str,
        attachment: Option<&str>,
    ) -> Result<String> {
        self.run_turn(session_key, user_text, attachment, None).await
    }

    /// Like [`Agent::submit_turn`], but streams final-answer tokens through
    /// the callback as they arrive
    pub async fn submit_turn_streaming(
        &self,
        session_key: &str,
        user_text: &str,
        attachment: Option<&str>,
        on_token: StreamCallback,
    ) -> Result<String> {
        self.run_turn(session_key, user_text, attachment, Some(on_token))
            .await
    }

    async fn run_turn(
        &self,
        session_key: &str,
        user_text: &str,
        attachment: Option<&str>,
        on_token: Option<StreamCallback>,
    ) -> Result<String> {
        // Reject a second turn on a busy session before touching any state
        let guard = self.sessions.begin_turn(session_key)?;
        let on_token: Option<Arc<dyn Fn(&str) + Send + Sync>> = on_token.map(Arc::from);

        let user_message = match attachment {
            Some(path) => format!("{} {}", user_text, path),
            None => user_text.to_string(),
        };

        let mut state = TurnState::begin(guard.snapshot(), user_message, self.config.agent.max_steps);
        info!(session = session_key, max_steps = state.max_steps, "turn started");

        while state.should_continue() {
            let response = self.think(&state, on_token.as_ref()).await?;

            if !response.has_tool_calls() {
                if response.content.trim().is_empty() {
                    // A turn never ends with an empty answer
                    return Err(SavantError::adapter(
                        "Model returned an empty response with no tool calls",
                    ));
                }
                state.on_answer(response.content);
                break;
            }

            debug!(
                session = session_key,
                step = state.step,
                calls = response.tool_calls.len(),
                "executing requested tools"
            );

            let calls = response.tool_calls.clone();
            state.on_tool_calls(response.content, response.tool_calls);

            // All requested calls produce a result before the model runs again
            let results = self.executor.execute_all(&calls).await;
            state.on_tool_results(results);
        }

        let max_steps = state.max_steps;
        let steps = state.step;
        match state.finish() {
            Some((answer, conversation)) => {
                guard.commit(conversation);
                info!(session = session_key, steps, "turn complete");
                Ok(answer)
            }
            None => {
                // Guard dropped without commit: the session keeps its pre-turn state
                Err(SavantError::IterationLimitExceeded(max_steps))
            }
        }
    }

    /// One model invocation over the staged conversation
    async fn think(
        &self,
        state: &TurnState,
        on_token: Option<&Arc<dyn Fn(&str) + Send + Sync>>,
    ) -> Result<ModelResponse> {
        let options = CompletionOptions {
            temperature: Some(self.config.model.temperature),
            ..CompletionOptions::default()
        };

        let completion = async {
            match on_token {
                Some(callback) => {
                    let callback = callback.clone();
                    let forward: StreamCallback = Box::new(move |token: &str| callback(token));
                    self.model
                        .complete_stream(
                            &self.config.agent.system_instruction,
                            &self.descriptors,
                            state.staged().messages(),
                            Some(options),
                            forward,
                        )
                        .await
                }
                None => {
                    self.model
                        .complete(
                            &self.config.agent.system_instruction,
                            &self.descriptors,
                            state.staged().messages(),
                            Some(options),
                        )
                        .await
                }
            }
        };

        let timeout = Duration::from_secs(self.config.model.timeout_secs);
        match tokio::time::timeout(timeout, completion).await {
            Ok(result) => result,
            Err(_) => Err(SavantError::AdapterTimeout(timeout.as_secs())),
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Snapshot of a session's conversation
    pub async fn conversation(&self, session_key: &str) -> Conversation {
        self.sessions.get(session_key).await
    }

    /// Reset a session to an empty conversation
    pub async fn clear_session(&self, session_key: &str) {
        self.sessions.save(session_key, Conversation::new()).await;
    }

    /// Number of registered capabilities
    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Name of the model adapter in use
    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}
