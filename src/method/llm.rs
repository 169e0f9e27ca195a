//! [`ModelClient`] backed by the `genai` multi-provider chat client.
//!
//! The provider is resolved by `genai` from the model name; API keys come from the provider's
//! usual environment variable (`GROQ_API_KEY` for the default Groq models). Transport failures
//! are retried with a fixed backoff; malformed responses are not.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::DEFAULT_MODEL_PROVIDER;
use crate::evidence::ModelIdentity;

use super::client::{ModelClient, ModelClientError, ModelRequest, ModelResponse, ModelSelection};

const CALL_RETRIES: usize = 3;
const CALL_RETRY_BACKOFF: Duration = Duration::from_millis(750);

const SYSTEM_PROMPT: &str = "You are a medical coding expert. Return only valid JSON.";

pub struct GenaiModelClient {
    client: Client,
    model: String,
    provider: String,
    options: ChatOptions,
    max_attempts: usize,
    backoff: Duration,
}

impl std::fmt::Debug for GenaiModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiModelClient")
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl GenaiModelClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
            provider: DEFAULT_MODEL_PROVIDER.to_string(),
            options: ChatOptions::default()
                .with_temperature(0.1)
                .with_max_tokens(2000)
                .with_top_p(0.9),
            max_attempts: CALL_RETRIES,
            backoff: CALL_RETRY_BACKOFF,
        }
    }

    /// Provider label recorded in [`ModelIdentity`]. Does not change routing.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_retries(mut self, max_attempts: usize, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for GenaiModelClient {
    async fn select_codes(
        &self,
        request: &ModelRequest,
    ) -> Result<ModelResponse, ModelClientError> {
        let prompt = build_prompt(request);

        let mut attempt = 0usize;
        let response = loop {
            attempt += 1;

            let chat_req = ChatRequest::new(vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt.clone()),
            ]);

            match self
                .client
                .exec_chat(&self.model, chat_req, Some(&self.options))
                .await
            {
                Ok(resp) => break resp,
                Err(e) => {
                    if attempt >= self.max_attempts {
                        return Err(ModelClientError::Transport {
                            attempts: attempt,
                            reason: e.to_string(),
                        });
                    }
                    warn!(
                        model = %self.model,
                        attempt,
                        error = %e,
                        "Model call failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        };

        let text = response
            .first_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ModelClientError::EmptyResponse)?;

        debug!(model = %self.model, chars = text.len(), "Model response received");

        let selections = parse_selections(text)?;

        let usage = &response.usage;
        let model = ModelIdentity {
            prompt_tokens: usage.prompt_tokens.and_then(|t| u32::try_from(t).ok()),
            completion_tokens: usage.completion_tokens.and_then(|t| u32::try_from(t).ok()),
            total_tokens: usage.total_tokens.and_then(|t| u32::try_from(t).ok()),
            ..ModelIdentity::new(self.model.clone(), self.provider.clone())
        };

        Ok(ModelResponse { selections, model })
    }
}

pub(crate) fn build_prompt(request: &ModelRequest) -> String {
    let mut codes = String::from("Most relevant HCPCS codes (based on text similarity):\n\n");
    for candidate in &request.candidates {
        let _ = writeln!(
            codes,
            "{}: {} (similarity: {:.3})",
            candidate.code, candidate.description, candidate.similarity
        );
    }

    format!(
        r#"Review the policy text and the candidate HCPCS codes below.

Policy Text:
{policy}

{codes}
Task: decide which of the candidate codes genuinely apply to this policy. For each one give:
1. the code
2. confidence between 0.0 and 1.0 that the code applies
3. brief reasoning explaining why the code is relevant

Return ONLY a JSON array:
[
  {{"code": "XXXXX", "confidence": 0.85, "reasoning": "This code is relevant because..."}}
]

Rules:
- Only include codes from the candidate list that clearly apply to the policy.
- A high similarity score does not by itself make a code relevant.
- If none of the codes apply, return: []
"#,
        policy = request.policy_text,
        codes = codes,
    )
}

/// Pulls the JSON array out of a chat response that may wrap it in prose or code fences.
pub(crate) fn extract_json_array(text: &str) -> &str {
    let mut text = text.trim();

    if let Some((_, rest)) = text.split_once("```json") {
        text = rest.split("```").next().unwrap_or(rest).trim();
    } else if let Some((_, rest)) = text.split_once("```") {
        text = rest.split("```").next().unwrap_or(rest).trim();
    }

    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Parses selections; individual malformed items are skipped, a non-array response is an error.
pub(crate) fn parse_selections(text: &str) -> Result<Vec<ModelSelection>, ModelClientError> {
    let json = extract_json_array(text);
    let value: Value =
        serde_json::from_str(json).map_err(|e| ModelClientError::MalformedResponse {
            reason: e.to_string(),
        })?;

    let Value::Array(items) = value else {
        return Err(ModelClientError::MalformedResponse {
            reason: "expected a JSON array".to_string(),
        });
    };

    Ok(items
        .iter()
        .filter_map(|item| match parse_selection(item) {
            Some(selection) => Some(selection),
            None => {
                warn!(item = %item, "Skipping unparseable model selection");
                None
            }
        })
        .collect())
}

fn parse_selection(item: &Value) -> Option<ModelSelection> {
    let code = match item.get("code")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if code.is_empty() {
        return None;
    }

    let confidence = match item.get("confidence")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    let reasoning = item
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(ModelSelection {
        code,
        confidence,
        reasoning,
    })
}
