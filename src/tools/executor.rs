//! Tool executor - resolves and runs tool calls
//!
//! Every request produces a `ToolResult`: unknown tools, capability errors,
//! and per-call timeouts are captured as failed results rather than raised,
//! so the model can see the failure and react to it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::core::{ToolCallRequest, ToolResult};
use crate::tools::ToolRegistry;

/// Executes tool calls against a registry
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    /// Create a new executor over a registry with a per-call timeout
    pub fn new(registry: Arc<ToolRegistry>, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Execute a single tool call
    pub async fn execute(&self, request: &ToolCallRequest) -> ToolResult {
        let Some(tool) = self.registry.get(&request.name) else {
            warn!(tool = %request.name, "unknown tool requested");
            return ToolResult::failure(
                &request.id,
                &request.name,
                format!("Unknown tool: {}", request.name),
            );
        };

        debug!(tool = %request.name, call_id = %request.id, "executing tool");

        match tokio::time::timeout(self.timeout, tool.invoke(request.arguments.clone())).await {
            Ok(Ok(output)) => ToolResult::success(&request.id, &request.name, output),
            Ok(Err(error)) => ToolResult::failure(&request.id, &request.name, error),
            Err(_) => ToolResult::failure(
                &request.id,
                &request.name,
                format!(
                    "Tool '{}' timed out after {}s",
                    request.name,
                    self.timeout.as_secs()
                ),
            ),
        }
    }

    /// Execute a batch of tool calls concurrently
    ///
    /// Results come back in the original request order regardless of
    /// completion order, so history appension is reproducible.
    pub async fn execute_all(&self, requests: &[ToolCallRequest]) -> Vec<ToolResult> {
        if requests.len() == 1 {
            return vec![self.execute(&requests[0]).await];
        }

        let mut set: JoinSet<(usize, ToolResult)> = JoinSet::new();

        for (index, request) in requests.iter().enumerate() {
            let executor = self.clone();
            let request = request.clone();
            set.spawn(async move { (index, executor.execute(&request).await) });
        }

        let mut slots: Vec<Option<ToolResult>> = (0..requests.len()).map(|_| None).collect();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "tool task panicked"),
            }
        }

        // A panicked task still owes its request a result
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    let request = &requests[index];
                    ToolResult::failure(
                        &request.id,
                        &request.name,
                        format!("Tool '{}' crashed during execution", request.name),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolDescriptor;
    use crate::tools::Tool;
    use async_trait::async_trait;

    struct SlowEcho {
        delay_ms: u64,
    }

    #[async_trait]
    impl Tool for SlowEcho {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("slow_echo", "Echo after a delay", serde_json::json!({}))
        }

        async fn invoke(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<serde_json::Value, String> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(arguments)
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("broken", "Always fails", serde_json::json!({}))
        }

        async fn invoke(
            &self,
            _arguments: serde_json::Value,
        ) -> std::result::Result<serde_json::Value, String> {
            Err("capability exploded".to_string())
        }
    }

    fn executor_with(tools: Vec<Arc<dyn Tool>>) -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool);
        }
        ToolExecutor::new(Arc::new(registry), 5)
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_failed_result() {
        let executor = executor_with(vec![]);
        let request = ToolCallRequest::new("nope", serde_json::json!({}));

        let result = executor.execute(&request).await;
        assert!(!result.success);
        assert_eq!(result.call_id, request.id);
        assert!(result.output_text().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_capability_failure_is_captured() {
        let executor = executor_with(vec![Arc::new(FailingTool)]);
        let request = ToolCallRequest::new("broken", serde_json::json!({}));

        let result = executor.execute(&request).await;
        assert!(!result.success);
        assert_eq!(result.output_text(), "capability exploded");
    }

    #[tokio::test]
    async fn test_batch_preserves_request_order() {
        let executor = executor_with(vec![Arc::new(SlowEcho { delay_ms: 50 })]);

        // First request finishes last; order must still match the requests
        let requests = vec![
            ToolCallRequest::new("slow_echo", serde_json::json!({"n": 1})),
            ToolCallRequest::new("missing", serde_json::json!({"n": 2})),
        ];

        let results = executor.execute_all(&requests).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].call_id, requests[0].id);
        assert_eq!(results[1].call_id, requests[1].id);
        assert!(results[0].success);
        assert!(!results[1].success);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failed_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SlowEcho { delay_ms: 2000 }));
        let executor = ToolExecutor::new(Arc::new(registry), 0);

        let request = ToolCallRequest::new("slow_echo", serde_json::json!({}));
        let result = executor.execute(&request).await;
        assert!(!result.success);
        assert!(result.output_text().contains("timed out"));
    }
}
