//! Text enhancement, the external collaborator behind "Improve with AI".
//!
//! The editor only knows the `TextEnhancer` trait. `AppState` carries an
//! `Arc<dyn TextEnhancer>`; the default backend is `LlmTextEnhancer`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::entries::models::EntryType;
use crate::entries::prompts::{IMPROVE_PROMPT_TEMPLATE, IMPROVE_SYSTEM};
use crate::llm_client::prompts::{NO_FABRICATION_INSTRUCTION, PLAIN_TEXT_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

/// What the collaborator is asked to rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveRequest {
    pub current_text: String,
    pub entry_type: EntryType,
}

/// Failure reported by a collaborator. The display string is shown to the
/// user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnhancementError {
    #[error("{0}")]
    Message(String),

    #[error("Failed to improve description")]
    Failed,
}

#[async_trait]
pub trait TextEnhancer: Send + Sync {
    async fn enhance(&self, request: &ImproveRequest) -> Result<String, EnhancementError>;
}

/// Rewrites descriptions through Claude.
pub struct LlmTextEnhancer(pub LlmClient);

#[async_trait]
impl TextEnhancer for LlmTextEnhancer {
    async fn enhance(&self, request: &ImproveRequest) -> Result<String, EnhancementError> {
        let prompt = build_improve_prompt(request);
        let system =
            format!("{IMPROVE_SYSTEM} {NO_FABRICATION_INSTRUCTION} {PLAIN_TEXT_INSTRUCTION}");

        debug!(
            "Improving {} description ({} chars)",
            request.entry_type,
            request.current_text.len()
        );

        self.0.call_text(&prompt, &system).await.map_err(|e| {
            warn!("Description improvement failed: {e}");
            match e {
                LlmError::RateLimited { .. } => EnhancementError::Message(
                    "The AI service is busy, please try again shortly".to_string(),
                ),
                _ => EnhancementError::Failed,
            }
        })
    }
}

fn build_improve_prompt(request: &ImproveRequest) -> String {
    IMPROVE_PROMPT_TEMPLATE
        .replace("{entry_type}", request.entry_type.as_str())
        .replace("{current_text}", &request.current_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ImproveRequest {
        ImproveRequest {
            current_text: "Built stuff".to_string(),
            entry_type: EntryType::Project,
        }
    }

    #[test]
    fn test_prompt_embeds_type_and_text() {
        let prompt = build_improve_prompt(&request());
        assert!(prompt.contains("project description"));
        assert!(prompt.contains("Built stuff"));
        assert!(!prompt.contains("{current_text}"));
    }

    #[test]
    fn test_request_wire_shape() {
        assert_eq!(
            serde_json::to_value(request()).unwrap(),
            json!({"currentText": "Built stuff", "entryType": "project"})
        );
    }

    #[tokio::test]
    async fn test_llm_enhancer_returns_rewrite() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Built stuff using scalable architecture"}],
                "usage": {"input_tokens": 40, "output_tokens": 9}
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::new("k".into()).unwrap().with_api_url(server.uri());
        let improved = LlmTextEnhancer(llm).enhance(&request()).await.unwrap();
        assert_eq!(improved, "Built stuff using scalable architecture");
    }

    #[tokio::test]
    async fn test_llm_enhancer_hides_api_details() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::new("k".into()).unwrap().with_api_url(server.uri());
        let err = LlmTextEnhancer(llm).enhance(&request()).await.unwrap_err();
        assert_eq!(err, EnhancementError::Failed);
        assert_eq!(err.to_string(), "Failed to improve description");
    }
}
