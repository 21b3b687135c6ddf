//! Gemini client implementation
//!
//! Async HTTP client for the Gemini generateContent API with tool calling
//! and streamed answers.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::{
    Config, Message, Result, Role, SavantError, ToolCallRequest, ToolDescriptor,
};
use crate::llm::traits::{
    CompletionOptions, ModelAdapter, ModelResponse, StreamCallback, TokenUsage,
};

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolGroup<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// System instruction wrapper
#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

/// One entry of the request's tools array
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolGroup<'a> {
    function_declarations: &'a [ToolDescriptor],
}

/// Gemini generation options
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// A content block in Gemini message format
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

/// One part of a content block
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

/// Function call requested by the model
#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

/// Function result reported back to the model
#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: serde_json::Value,
}

/// Gemini generateContent response (one chunk when streaming)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiClient {
    /// Create a new Gemini client from configuration
    ///
    /// Fails fast when the API key is absent from the environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = Config::api_key()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.model.timeout_secs))
            .build()
            .map_err(SavantError::Http)?;

        Ok(Self {
            client,
            base_url: config.model.base_url.clone(),
            api_key,
            model: config.model.name.clone(),
            temperature: config.model.temperature,
        })
    }

    /// Convert internal messages to Gemini content blocks
    fn to_contents(messages: &[Message]) -> Vec<Content> {
        messages.iter().map(Self::to_content).collect()
    }

    fn to_content(msg: &Message) -> Content {
        match msg.role {
            Role::User => Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(msg.content.clone()),
                    ..Part::default()
                }],
            },
            Role::Assistant => {
                let mut parts = Vec::new();
                if !msg.content.is_empty() {
                    parts.push(Part {
                        text: Some(msg.content.clone()),
                        ..Part::default()
                    });
                }
                for call in msg.tool_calls() {
                    parts.push(Part {
                        function_call: Some(FunctionCall {
                            name: call.name.clone(),
                            args: call.arguments.clone(),
                        }),
                        ..Part::default()
                    });
                }
                Content {
                    role: "model".to_string(),
                    parts,
                }
            }
            Role::Tool => {
                // Tool results travel back as user-role functionResponse parts
                let (name, response) = match &msg.tool_result {
                    Some(result) => (result.tool_name.clone(), Self::to_response_payload(result)),
                    None => (
                        "unknown".to_string(),
                        serde_json::json!({ "result": msg.content }),
                    ),
                };
                Content {
                    role: "user".to_string(),
                    parts: vec![Part {
                        function_response: Some(FunctionResponse { name, response }),
                        ..Part::default()
                    }],
                }
            }
        }
    }

    /// The functionResponse payload must be a JSON object
    fn to_response_payload(result: &crate::core::ToolResult) -> serde_json::Value {
        if !result.success {
            return serde_json::json!({ "error": result.output_text() });
        }
        match &result.output {
            serde_json::Value::Object(_) => result.output.clone(),
            other => serde_json::json!({ "result": other }),
        }
    }

    /// Fold a response's parts into content text and tool-call requests
    ///
    /// Gemini function calls carry no identifier of their own; each request
    /// gets a generated one so results can be correlated.
    fn collect_parts(
        content: Option<Content>,
        text: &mut String,
        tool_calls: &mut Vec<ToolCallRequest>,
        on_token: Option<&StreamCallback>,
    ) {
        let Some(content) = content else {
            return;
        };

        for part in content.parts {
            if let Some(t) = part.text {
                if let Some(callback) = on_token {
                    callback(&t);
                }
                text.push_str(&t);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCallRequest::new(call.name, call.args));
            }
        }
    }

    fn to_usage(metadata: Option<UsageMetadata>) -> Option<TokenUsage> {
        metadata.map(|m| TokenUsage {
            prompt_tokens: m.prompt_token_count,
            completion_tokens: m.candidates_token_count,
            total_tokens: m.total_token_count,
        })
    }

    fn build_request<'a>(
        &'a self,
        system_instruction: &'a str,
        tools: &'a [ToolDescriptor],
        conversation: &[Message],
        options: Option<&CompletionOptions>,
    ) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: system_instruction,
                }],
            },
            contents: Self::to_contents(conversation),
            tools: if tools.is_empty() {
                None
            } else {
                Some(vec![ToolGroup {
                    function_declarations: tools,
                }])
            },
            generation_config: Some(GenerationConfig {
                temperature: Some(
                    options
                        .and_then(|o| o.temperature)
                        .unwrap_or(self.temperature),
                ),
                max_output_tokens: options.and_then(|o| o.max_tokens),
            }),
        }
    }

    async fn send(
        &self,
        endpoint: String,
        request: &GenerateRequest<'_>,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    SavantError::adapter(format!(
                        "Cannot reach the Gemini API at {}. Check your network connection",
                        self.base_url
                    ))
                } else {
                    SavantError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(SavantError::adapter(format!(
                    "Gemini rejected the API key ({}): {}",
                    status, error_text
                )));
            }

            return Err(SavantError::adapter(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelAdapter for GeminiClient {
    async fn complete(
        &self,
        system_instruction: &str,
        tools: &[ToolDescriptor],
        conversation: &[Message],
        options: Option<CompletionOptions>,
    ) -> Result<ModelResponse> {
        let request = self.build_request(system_instruction, tools, conversation, options.as_ref());
        debug!(model = %self.model, contents = conversation.len(), tools = tools.len(), "gemini request");

        let endpoint = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self.send(endpoint, &request).await?;

        let response_text = response.text().await?;
        debug!(bytes = response_text.len(), "gemini response");

        let parsed: GenerateResponse = serde_json::from_str(&response_text)
            .map_err(|e| SavantError::adapter(format!("Failed to parse response: {}", e)))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        let candidate = parsed.candidates.into_iter().next();
        Self::collect_parts(
            candidate.and_then(|c| c.content),
            &mut content,
            &mut tool_calls,
            None,
        );

        Ok(ModelResponse {
            content,
            tool_calls,
            usage: Self::to_usage(parsed.usage_metadata),
            model: parsed.model_version.unwrap_or_else(|| self.model.clone()),
        })
    }

    async fn complete_stream(
        &self,
        system_instruction: &str,
        tools: &[ToolDescriptor],
        conversation: &[Message],
        options: Option<CompletionOptions>,
        on_token: StreamCallback,
    ) -> Result<ModelResponse> {
        let request = self.build_request(system_instruction, tools, conversation, options.as_ref());
        debug!(model = %self.model, contents = conversation.len(), "gemini stream request");

        let endpoint = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let response = self.send(endpoint, &request).await?;

        let mut content = String::new();
        let mut tool_calls: Vec<ToolCallRequest> = Vec::new();
        let mut usage: Option<UsageMetadata> = None;
        let mut final_model = self.model.clone();

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| SavantError::adapter(format!("Stream error: {}", e)))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete SSE lines from buffer
            while let Some(newline_pos) = buffer.find('\n') {
                let line = buffer[..newline_pos].trim().to_string();
                buffer = buffer[newline_pos + 1..].to_string();

                let Some(payload) = line.strip_prefix("data:").map(str::trim) else {
                    continue;
                };
                if payload.is_empty() || payload == "[DONE]" {
                    continue;
                }

                match serde_json::from_str::<GenerateResponse>(payload) {
                    Ok(parsed) => {
                        if let Some(model) = parsed.model_version {
                            final_model = model;
                        }
                        if parsed.usage_metadata.is_some() {
                            usage = parsed.usage_metadata;
                        }
                        let candidate = parsed.candidates.into_iter().next();
                        Self::collect_parts(
                            candidate.and_then(|c| c.content),
                            &mut content,
                            &mut tool_calls,
                            Some(&on_token),
                        );
                    }
                    Err(e) => {
                        warn!(error = %e, "skipping unparseable stream chunk");
                    }
                }
            }
        }

        Ok(ModelResponse {
            content,
            tool_calls,
            usage: Self::to_usage(usage),
            model: final_model,
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
