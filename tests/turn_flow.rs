//! Turn-level behavior of the orchestration core, driven by scripted
//! model-adapter and tool stubs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use savant::agent::Agent;
use savant::core::{
    Config, Message, Result, Role, SavantError, ToolCallRequest, ToolDescriptor,
};
use savant::llm::{CompletionOptions, ModelAdapter, ModelResponse, StreamCallback};
use savant::tools::{Tool, ToolRegistry};

/// One scripted model step
enum Step {
    Answer(&'static str),
    Calls(Vec<(&'static str, serde_json::Value)>),
    Fail(&'static str),
}

/// Adapter that replays a fixed script, one step per completion call
struct ScriptedAdapter {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedAdapter {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            delay: None,
        })
    }

    fn with_delay(steps: Vec<Step>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    fn completions(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelAdapter for ScriptedAdapter {
    async fn complete(
        &self,
        _system_instruction: &str,
        _tools: &[ToolDescriptor],
        _conversation: &[Message],
        _options: Option<CompletionOptions>,
    ) -> Result<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("adapter called more times than scripted");

        match step {
            Step::Answer(text) => Ok(ModelResponse {
                content: text.to_string(),
                tool_calls: Vec::new(),
                usage: None,
                model: "stub".to_string(),
            }),
            Step::Calls(calls) => Ok(ModelResponse {
                content: String::new(),
                tool_calls: calls
                    .into_iter()
                    .map(|(name, args)| ToolCallRequest::new(name, args))
                    .collect(),
                usage: None,
                model: "stub".to_string(),
            }),
            Step::Fail(reason) => Err(SavantError::adapter(reason)),
        }
    }

    async fn complete_stream(
        &self,
        system_instruction: &str,
        tools: &[ToolDescriptor],
        conversation: &[Message],
        options: Option<CompletionOptions>,
        on_token: StreamCallback,
    ) -> Result<ModelResponse> {
        let response = self
            .complete(system_instruction, tools, conversation, options)
            .await?;
        if !response.content.is_empty() {
            on_token(&response.content);
        }
        Ok(response)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Adapter that requests the same valid tool call forever
struct LoopingAdapter {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelAdapter for LoopingAdapter {
    async fn complete(
        &self,
        _system_instruction: &str,
        _tools: &[ToolDescriptor],
        _conversation: &[Message],
        _options: Option<CompletionOptions>,
    ) -> Result<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ModelResponse {
            content: String::new(),
            tool_calls: vec![ToolCallRequest::new(
                "search_wikipedia",
                serde_json::json!({"query": "anything"}),
            )],
            usage: None,
            model: "stub".to_string(),
        })
    }

    async fn complete_stream(
        &self,
        system_instruction: &str,
        tools: &[ToolDescriptor],
        conversation: &[Message],
        options: Option<CompletionOptions>,
        _on_token: StreamCallback,
    ) -> Result<ModelResponse> {
        self.complete(system_instruction, tools, conversation, options)
            .await
    }

    fn name(&self) -> &str {
        "looping"
    }
}

/// Stub capability returning a fixed payload
struct FixedTool {
    name: &'static str,
    payload: serde_json::Value,
}

#[async_trait]
impl Tool for FixedTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            self.name,
            "stub capability",
            serde_json::json!({"type": "object", "properties": {}}),
        )
    }

    async fn invoke(
        &self,
        _arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String> {
        Ok(self.payload.clone())
    }
}

fn research_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FixedTool {
        name: "analyze_image",
        payload: serde_json::json!({"label": "cat"}),
    }));
    registry.register(Arc::new(FixedTool {
        name: "search_wikipedia",
        payload: serde_json::json!({"summary": "An article."}),
    }));
    registry
}

fn test_config(max_steps: usize) -> Config {
    let mut config = Config::default();
    config.agent.max_steps = max_steps;
    config.model.timeout_secs = 5;
    config.tools.timeout_secs = 5;
    config
}

#[tokio::test]
async fn plain_answer_grows_conversation_by_two() {
    let adapter = ScriptedAdapter::new(vec![Step::Answer("It's a landmark in Paris.")]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    let answer = agent
        .submit_turn("s1", "What is the Eiffel Tower?", None)
        .await
        .unwrap();
    assert_eq!(answer, "It's a landmark in Paris.");

    let conversation = agent.conversation("s1").await;
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.messages()[0].role, Role::User);
    assert_eq!(conversation.messages()[0].content, "What is the Eiffel Tower?");
    assert_eq!(conversation.messages()[1].role, Role::Assistant);
}

#[tokio::test]
async fn image_question_routes_through_tool() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Calls(vec![(
            "analyze_image",
            serde_json::json!({"path": "photo.jpg"}),
        )]),
        Step::Answer("That's a cat."),
    ]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    let answer = agent
        .submit_turn("s1", "What's in this photo?", Some("photo.jpg"))
        .await
        .unwrap();
    assert_eq!(answer, "That's a cat.");

    let conversation = agent.conversation("s1").await;
    let messages = conversation.messages();
    assert_eq!(messages.len(), 4);

    // user / assistant-toolcall / tool-result / assistant-answer, in order
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "What's in this photo? photo.jpg");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].tool_calls().len(), 1);
    assert_eq!(messages[2].role, Role::Tool);
    assert_eq!(messages[3].role, Role::Assistant);
    assert_eq!(messages[3].content, "That's a cat.");

    let request_id = &messages[1].tool_calls()[0].id;
    let result = messages[2].tool_result.as_ref().unwrap();
    assert_eq!(&result.call_id, request_id);
    assert!(result.success);
    assert_eq!(result.output["label"], "cat");
}

#[tokio::test]
async fn batched_tool_calls_all_get_results_in_request_order() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Calls(vec![
            ("analyze_image", serde_json::json!({"path": "a.jpg"})),
            ("search_wikipedia", serde_json::json!({"query": "cats"})),
            ("search_wikipedia", serde_json::json!({"query": "dogs"})),
        ]),
        Step::Answer("Done."),
    ]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    agent.submit_turn("s1", "Compare my pets", None).await.unwrap();

    let conversation = agent.conversation("s1").await;
    let messages = conversation.messages();

    // 1 user + 1 assistant-with-requests + 3 tool results + 1 answer
    assert_eq!(messages.len(), 6);

    let request_ids: Vec<&str> = messages[1]
        .tool_calls()
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    let result_ids: Vec<&str> = messages[2..5]
        .iter()
        .map(|m| m.tool_result.as_ref().unwrap().call_id.as_str())
        .collect();

    // Every request answered exactly once, results in request order
    assert_eq!(request_ids, result_ids);
}

#[tokio::test]
async fn unknown_tool_failure_is_fed_back_not_fatal() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Calls(vec![("look_up_stars", serde_json::json!({}))]),
        Step::Answer("I couldn't use that tool, sorry."),
    ]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    let answer = agent.submit_turn("s1", "Query the stars", None).await.unwrap();
    assert_eq!(answer, "I couldn't use that tool, sorry.");

    let conversation = agent.conversation("s1").await;
    let result = conversation.messages()[2].tool_result.as_ref().unwrap();
    assert!(!result.success);
    assert!(result.output_text().contains("Unknown tool"));
}

#[tokio::test]
async fn iteration_limit_fails_turn_and_leaves_history_untouched() {
    let adapter = Arc::new(LoopingAdapter {
        calls: AtomicUsize::new(0),
    });
    let agent = Agent::new(test_config(3), adapter.clone(), research_registry());

    let err = agent
        .submit_turn("s1", "Loop forever", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SavantError::IterationLimitExceeded(3)));

    // Exactly the configured bound of think steps ran
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 3);

    // No partial turn was committed
    assert!(agent.conversation("s1").await.is_empty());
}

#[tokio::test]
async fn adapter_failure_preserves_prior_turns() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Answer("First answer."),
        Step::Fail("quota exhausted"),
    ]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    agent.submit_turn("s1", "First question", None).await.unwrap();

    let err = agent
        .submit_turn("s1", "Second question", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SavantError::Adapter(_)));

    // Only the committed first turn remains
    let conversation = agent.conversation("s1").await;
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.messages()[1].content, "First answer.");
}

#[tokio::test]
async fn empty_answer_is_an_adapter_failure() {
    let adapter = ScriptedAdapter::new(vec![Step::Answer("")]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    let err = agent.submit_turn("s1", "Say nothing", None).await.unwrap_err();
    assert!(matches!(err, SavantError::Adapter(_)));
    assert!(agent.conversation("s1").await.is_empty());
}

#[tokio::test]
async fn concurrent_turn_on_same_session_is_rejected() {
    let adapter = ScriptedAdapter::with_delay(
        vec![Step::Answer("Slow answer."), Step::Answer("unreachable")],
        Duration::from_millis(200),
    );
    let agent = Arc::new(Agent::new(test_config(10), adapter, research_registry()));

    let first = {
        let agent = agent.clone();
        tokio::spawn(async move { agent.submit_turn("s1", "First", None).await })
    };

    // Let the first turn take the session before contending
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = agent.submit_turn("s1", "Second", None).await;
    assert!(matches!(second, Err(SavantError::SessionBusy(_))));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first, "Slow answer.");

    // The surviving history is the first turn alone, never an interleaving
    let conversation = agent.conversation("s1").await;
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.messages()[0].content, "First");
}

#[tokio::test]
async fn turns_for_different_sessions_run_independently() {
    let adapter = ScriptedAdapter::with_delay(
        vec![Step::Answer("one"), Step::Answer("two")],
        Duration::from_millis(50),
    );
    let agent = Arc::new(Agent::new(test_config(10), adapter, research_registry()));

    let a = {
        let agent = agent.clone();
        tokio::spawn(async move { agent.submit_turn("s1", "hello", None).await })
    };
    let b = {
        let agent = agent.clone();
        tokio::spawn(async move { agent.submit_turn("s2", "hello", None).await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(agent.conversation("s1").await.len(), 2);
    assert_eq!(agent.conversation("s2").await.len(), 2);
}

#[tokio::test]
async fn reading_an_unknown_session_is_idempotent() {
    let adapter = ScriptedAdapter::new(vec![]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    let first = agent.conversation("never-seen").await;
    let second = agent.conversation("never-seen").await;

    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(first.len(), second.len());
}

#[tokio::test]
async fn sequential_turns_accumulate_history() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Answer("It's a landmark in Paris."),
        Step::Answer("It was finished in 1889."),
    ]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    agent
        .submit_turn("s1", "What is the Eiffel Tower?", None)
        .await
        .unwrap();
    agent.submit_turn("s1", "When was it built?", None).await.unwrap();

    let conversation = agent.conversation("s1").await;
    assert_eq!(conversation.len(), 4);
    assert_eq!(conversation.messages()[2].content, "When was it built?");
}

#[tokio::test]
async fn streaming_turn_delivers_answer_tokens() {
    let adapter = ScriptedAdapter::new(vec![Step::Answer("It's a landmark in Paris.")]);
    let agent = Agent::new(test_config(10), adapter, research_registry());

    let seen = Arc::new(Mutex::new(String::new()));
    let sink = seen.clone();

    let answer = agent
        .submit_turn_streaming(
            "s1",
            "What is the Eiffel Tower?",
            None,
            Box::new(move |token| sink.lock().unwrap().push_str(token)),
        )
        .await
        .unwrap();

    assert_eq!(answer, "It's a landmark in Paris.");
    assert_eq!(*seen.lock().unwrap(), "It's a landmark in Paris.");
}
