// src/provider/google.rs — Google Generative AI (Gemini) provider

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider, Role, StopReason, TokenUsage};
use crate::infra::errors::SuiteGenError;

const PROVIDER_ID: &str = "google";

pub struct GoogleProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the Gemini request body from a ChatRequest.
    fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": m.content }],
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
        });

        if let Some(ref system) = request.system {
            body["system_instruction"] = serde_json::json!({
                "parts": [{ "text": system }],
            });
        }

        let mut gen_config = serde_json::json!({});
        if let Some(ref format) = request.response_format {
            gen_config["responseMimeType"] = serde_json::json!(format.mime_type);
            gen_config["responseSchema"] = format.schema.clone();
        }
        if gen_config != serde_json::json!({}) {
            body["generationConfig"] = gen_config;
        }

        body
    }
}

/// Extract text, usage and finish reason from a `generateContent` reply.
fn parse_generate_response(resp: &serde_json::Value) -> Result<ChatResponse, SuiteGenError> {
    let Some(candidate) = resp["candidates"].get(0) else {
        let reason = resp["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(SuiteGenError::provider(
            PROVIDER_ID,
            format!("Empty response: {}", reason),
        ));
    };

    let content: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .concat()
        })
        .unwrap_or_default();

    let stop_reason = match candidate["finishReason"].as_str() {
        Some("STOP") => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") => StopReason::Safety,
        _ => StopReason::Unknown,
    };

    if content.is_empty() {
        return Err(SuiteGenError::provider(
            PROVIDER_ID,
            format!("Response contained no text (finish reason: {:?})", stop_reason),
        ));
    }

    let usage = TokenUsage {
        input_tokens: resp["usageMetadata"]["promptTokenCount"]
            .as_u64()
            .unwrap_or(0) as u32,
        output_tokens: resp["usageMetadata"]["candidatesTokenCount"]
            .as_u64()
            .unwrap_or(0) as u32,
    };

    Ok(ChatResponse {
        content,
        usage,
        stop_reason,
    })
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SuiteGenError> {
        let body = self.build_request_body(&request);

        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SuiteGenError::provider(PROVIDER_ID, e.without_url().to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SuiteGenError::RateLimited {
                provider: PROVIDER_ID.into(),
                message: error_body,
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SuiteGenError::provider(
                PROVIDER_ID,
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| {
            SuiteGenError::provider(
                PROVIDER_ID,
                format!("Failed to parse response: {}", e.without_url()),
            )
        })?;

        let parsed = parse_generate_response(&resp)?;
        tracing::debug!(
            model = %request.model,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Gemini response received"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Message, ResponseFormat};

    fn provider() -> GoogleProvider {
        GoogleProvider::new("test-key".into(), "https://example.test/v1beta/")
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(provider().base_url, "https://example.test/v1beta");
    }

    #[test]
    fn test_body_maps_roles_and_system() {
        let request = ChatRequest {
            model: "gemini-2.0-flash".into(),
            system: Some("You are a tester".into()),
            messages: vec![
                Message::user("write tests"),
                Message::assistant("import unittest"),
                Message::user("feedback"),
            ],
            ..Default::default()
        };
        let body = provider().build_request_body(&request);

        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "import unittest");
        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "You are a tester"
        );
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_body_includes_response_schema() {
        let schema = serde_json::json!({"type": "OBJECT"});
        let request = ChatRequest {
            model: "m".into(),
            messages: vec![Message::user("x")],
            response_format: Some(ResponseFormat::json(schema.clone())),
            ..Default::default()
        };
        let body = provider().build_request_body(&request);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"], schema);
        // Only the structured-output settings are sent; sampling is left to the API
        assert_eq!(body["generationConfig"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_joins_text_parts() {
        let resp = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "```python\n"}, {"text": "pass\n```"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 7}
        });
        let parsed = parse_generate_response(&resp).unwrap();
        assert_eq!(parsed.content, "```python\npass\n```");
        assert_eq!(parsed.stop_reason, StopReason::EndTurn);
        assert_eq!(parsed.usage.total(), 19);
    }

    #[test]
    fn test_parse_blocked_prompt_is_error() {
        let resp = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = parse_generate_response(&resp).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_empty_text_is_error() {
        let resp = serde_json::json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]
        });
        let err = parse_generate_response(&resp).unwrap_err();
        assert!(err.is_provider_error());
        assert!(err.to_string().contains("MaxTokens"));
    }
}
