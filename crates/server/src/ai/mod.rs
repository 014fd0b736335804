//! Attachment advisor: asks an LLM endpoint where wings and engines attach.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use shared::{AttachmentOffsets, CompileRequest, Offset3};
use thiserror::Error;

use crate::config::ServerConfig;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = r#"
You are an aircraft assembly assistant. Given a list of aircraft components
(wing, fuselage, engine) with their parameters, decide where the wings and the
engines attach to the fuselage.

Frame: X runs from the nose towards the tail, Y runs spanwise (starboard is +Y),
Z is up. The fuselage nose is at the origin. The right-hand wing and engine are
placed at the given offset; the left-hand ones are mirrored across Y.

Respond with JSON only, in this exact shape (metres):
{
    "wing_attachment": { "position_x": f64, "position_y": f64, "position_z": f64 },
    "engine_attachment": { "position_x": f64, "position_y": f64, "position_z": f64 }
}
"#;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("attachment advisor is not configured")]
    NotConfigured,

    #[error("advisor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("advisor replied with status {0}")]
    Status(u16),

    #[error("advisor reply is malformed: {0}")]
    Malformed(String),

    #[error("advisor did not answer within {0:?}")]
    Timeout(Duration),
}

/// Source of attachment offsets for compilation.
pub trait AttachmentAdvisor: Send + Sync {
    fn advise(
        &self,
        request: &CompileRequest,
    ) -> impl Future<Output = Result<AttachmentOffsets, AdvisorError>> + Send;
}

pub struct ClaudeAdvisor {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeAdvisor {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &ServerConfig) -> Option<Self> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.advisor_model.clone()))
    }
}

impl AttachmentAdvisor for ClaudeAdvisor {
    async fn advise(&self, request: &CompileRequest) -> Result<AttachmentOffsets, AdvisorError> {
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "system": SYSTEM_PROMPT,
                "messages": [
                    {
                        "role": "user",
                        "content": format!("Components:\n{}", describe(request))
                    }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;

        // Извлекаем текст из ответа
        let text = body["content"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|block| block["text"].as_str())
            .ok_or_else(|| AdvisorError::Malformed("no text block in reply".to_string()))?;

        parse_offsets(text)
    }
}

/// Component summary sent to the advisor; geometry is left out.
fn describe(request: &CompileRequest) -> String {
    let components: Vec<serde_json::Value> = request
        .components
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "category": c.category,
                "parameters": c.parameters,
            })
        })
        .collect();

    let summary = serde_json::json!({
        "components": components,
        "aircraft": request.aircraft,
    });
    serde_json::to_string_pretty(&summary).unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
struct AdvisorReply {
    #[serde(default)]
    wing_attachment: Position,
    #[serde(default)]
    engine_attachment: Position,
}

#[derive(Debug, Default, Deserialize)]
struct Position {
    #[serde(default)]
    position_x: f64,
    #[serde(default)]
    position_y: f64,
    #[serde(default)]
    position_z: f64,
}

impl Position {
    fn offset(&self) -> Offset3 {
        Offset3::new(self.position_x, self.position_y, self.position_z)
    }
}

/// Parse the JSON object in an advisor reply; prose around it is ignored and
/// missing positions are zero.
pub fn parse_offsets(text: &str) -> Result<AttachmentOffsets, AdvisorError> {
    let json = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Err(AdvisorError::Malformed("no JSON object".to_string())),
    };

    let reply: AdvisorReply =
        serde_json::from_str(json).map_err(|e| AdvisorError::Malformed(e.to_string()))?;

    let offsets = AttachmentOffsets {
        wing: reply.wing_attachment.offset(),
        engine: reply.engine_attachment.offset(),
    };

    let all_finite = [offsets.wing, offsets.engine]
        .iter()
        .all(|o| o.x.is_finite() && o.y.is_finite() && o.z.is_finite());
    if !all_finite {
        return Err(AdvisorError::Malformed("non-finite position".to_string()));
    }

    Ok(offsets)
}

/// Ask the advisor, bounded by `timeout`.
pub async fn request_offsets<A: AttachmentAdvisor>(
    advisor: Option<&A>,
    request: &CompileRequest,
    timeout: Duration,
) -> Result<AttachmentOffsets, AdvisorError> {
    let advisor = advisor.ok_or(AdvisorError::NotConfigured)?;

    match tokio::time::timeout(timeout, advisor.advise(request)).await {
        Ok(Ok(offsets)) => {
            tracing::debug!(?offsets, "advisor offsets");
            Ok(offsets)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(AdvisorError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAdvisor(AttachmentOffsets);

    impl AttachmentAdvisor for FixedAdvisor {
        async fn advise(&self, _: &CompileRequest) -> Result<AttachmentOffsets, AdvisorError> {
            Ok(self.0)
        }
    }

    struct FailingAdvisor;

    impl AttachmentAdvisor for FailingAdvisor {
        async fn advise(&self, _: &CompileRequest) -> Result<AttachmentOffsets, AdvisorError> {
            Err(AdvisorError::Status(503))
        }
    }

    struct SlowAdvisor;

    impl AttachmentAdvisor for SlowAdvisor {
        async fn advise(&self, _: &CompileRequest) -> Result<AttachmentOffsets, AdvisorError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(AttachmentOffsets::default())
        }
    }

    fn request() -> CompileRequest {
        CompileRequest {
            components: geometry::fixtures::generated_components(),
            aircraft: None,
        }
    }

    #[test]
    fn test_parse_offsets_with_prose() {
        let text = r#"Here you go:
        {"wing_attachment": {"position_x": 10.0, "position_y": 1.75, "position_z": -0.5},
         "engine_attachment": {"position_x": 8, "position_y": 5, "position_z": -1}}
        Hope this helps."#;
        let offsets = parse_offsets(text).unwrap();
        assert_eq!(offsets.wing, Offset3::new(10.0, 1.75, -0.5));
        assert_eq!(offsets.engine, Offset3::new(8.0, 5.0, -1.0));
    }

    #[test]
    fn test_parse_offsets_missing_fields_are_zero() {
        let offsets = parse_offsets(r#"{"wing_attachment": {"position_x": 3}}"#).unwrap();
        assert_eq!(offsets.wing, Offset3::new(3.0, 0.0, 0.0));
        assert_eq!(offsets.engine, Offset3::default());
    }

    #[test]
    fn test_parse_offsets_rejects_garbage() {
        assert!(matches!(parse_offsets("no idea"), Err(AdvisorError::Malformed(_))));
        assert!(matches!(
            parse_offsets(r#"{"wing_attachment": "left"}"#),
            Err(AdvisorError::Malformed(_))
        ));
    }

    #[test]
    fn test_describe_omits_geometry() {
        let summary = describe(&request());
        assert!(summary.contains("Main Wing"));
        assert!(!summary.contains("vertices"));
    }

    #[tokio::test]
    async fn test_fixed_advisor_offsets_returned() {
        let expected = geometry::fixtures::typical_offsets();
        let advisor = FixedAdvisor(expected);
        let offsets = request_offsets(Some(&advisor), &request(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(offsets, expected);
    }

    #[tokio::test]
    async fn test_missing_advisor() {
        let result =
            request_offsets::<FixedAdvisor>(None, &request(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(AdvisorError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_failing_advisor() {
        let result = request_offsets(Some(&FailingAdvisor), &request(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(AdvisorError::Status(503))));
    }

    #[tokio::test]
    async fn test_slow_advisor_times_out() {
        let timeout = Duration::from_millis(20);
        let result = request_offsets(Some(&SlowAdvisor), &request(), timeout).await;
        assert!(matches!(result, Err(AdvisorError::Timeout(t)) if t == timeout));
    }

    #[tokio::test]
    async fn test_failure_compiles_with_zero_offsets() {
        let req = request();
        let offsets = request_offsets(Some(&FailingAdvisor), &req, Duration::from_secs(1)).await;
        let record = geometry::pipeline::compile_aircraft(&req.components, offsets);
        assert!(record
            .metadata
            .degradations
            .iter()
            .any(|d| matches!(d, shared::Degradation::AdvisorUnavailable { .. })));
    }

    #[test]
    fn test_no_key_no_advisor() {
        assert!(ClaudeAdvisor::from_config(&ServerConfig::default()).is_none());
        let config = ServerConfig {
            api_key: Some("key".to_string()),
            ..ServerConfig::default()
        };
        assert!(ClaudeAdvisor::from_config(&config).is_some());
    }
}
