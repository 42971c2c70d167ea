use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, error};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use url::Url;

use super::client::{AiClient, ImagePart};
use crate::config::{ConfigError, GeminiSettings};
use crate::error::{ScanError, ScanResult};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize, Debug)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Debug)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize, Debug)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiRequest {
    fn text(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: prompt.to_string(),
                }],
            }],
        }
    }

    fn multimodal(prompt: &str, image: &ImagePart) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime.as_str().to_string(),
                            data: STANDARD.encode(&image.bytes),
                        },
                    },
                ],
            }],
        }
    }
}

impl GeminiResponse {
    /// Joins the text parts of the first candidate.
    fn into_text(self) -> ScanResult<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ScanError::Service(format!(
                "Gemini blocked the request: {}",
                reason
            )));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ScanError::Service("No response from Gemini API".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(ScanError::Service(format!(
                "Gemini returned an empty answer (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

/// `AiClient` backed by the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    endpoint: Url,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            settings.api_base.trim_end_matches('/'),
            settings.model
        ))?;

        Ok(Self {
            http_client: HttpClient::new(),
            endpoint,
            api_key: settings.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn generate(&self, request: &GeminiRequest) -> ScanResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ScanError::Configuration(
                "Gemini API key not found. Set GEMINI_API_KEY in the environment or .env file."
                    .to_string(),
            )
        })?;

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini request failed: {}", e);
                ScanError::Service(format!("Could not reach Gemini API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API returned {}: {}", status, error_text);
            return Err(ScanError::Service(format!(
                "Gemini API error ({}): {}",
                status,
                error_text.trim()
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            ScanError::Service(format!("Unreadable response from Gemini API: {}", e))
        })?;

        let text = gemini_response.into_text()?;
        debug!("Gemini returned {} characters", text.len());
        Ok(text)
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn identify(&self, image: &ImagePart, prompt: &str) -> ScanResult<String> {
        self.generate(&GeminiRequest::multimodal(prompt, image)).await
    }

    async fn complete(&self, prompt: &str) -> ScanResult<String> {
        self.generate(&GeminiRequest::text(prompt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ImageMime;
    use serde_json::json;

    fn settings(api_key: Option<&str>) -> GeminiSettings {
        GeminiSettings {
            api_key: api_key.map(str::to_string),
            model: "gemini-1.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
        }
    }

    #[test]
    fn builds_the_model_endpoint() {
        let client = GeminiClient::new(&settings(Some("key"))).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn rejects_a_malformed_base_url() {
        let mut bad = settings(None);
        bad.api_base = "not a url".to_string();
        assert!(matches!(
            GeminiClient::new(&bad),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn multimodal_request_carries_text_then_inline_image() {
        let image = ImagePart::new(vec![1, 2, 3], ImageMime::Png);
        let request = GeminiRequest::multimodal("identify this", &image);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "parts": [
                        {"text": "identify this"},
                        {"inline_data": {"mime_type": "image/png", "data": "AQID"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn text_request_has_no_image_part() {
        let value = serde_json::to_value(GeminiRequest::text("care tips")).unwrap();
        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "care tips");
    }

    #[test]
    fn joins_text_parts_of_the_first_candidate() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "{\"name\":"}, {"text": "\"Aloe\"}"}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"name\":\"Aloe\"}");
    }

    #[test]
    fn blocked_prompt_is_a_service_error() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(
            response.into_text(),
            Err(ScanError::Service(msg)) if msg.contains("SAFETY")
        ));
    }

    #[test]
    fn empty_candidates_are_a_service_error() {
        let response = GeminiResponse::default();
        assert!(matches!(response.into_text(), Err(ScanError::Service(_))));
    }

    #[actix_web::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(&settings(None)).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, ScanError::Configuration(_)));

        let image = ImagePart::new(vec![0xFF, 0xD8, 0xFF], ImageMime::Jpeg);
        let err = client.identify(&image, "hello").await.unwrap_err();
        assert!(matches!(err, ScanError::Configuration(_)));
    }
}
