//! Gemini REST payload types for `generateContent` and `predictLongRunning`.

use serde::{Deserialize, Serialize};

/// Content container used in both requests and responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single content part. Exactly one of the fields is set on requests;
/// responses may carry other fields, which are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }
}

/// Base64 inline media payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub image_config: ImageConfig,
}

/// Output shape of a generated image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
    pub image_size: String,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// First inline image part of the first candidate, if any.
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.inline_data.as_ref()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictVideoRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
    pub image: VideoImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub sample_count: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

/// Long-running video operation handle as returned by submit and poll.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    #[serde(default)]
    pub error: Option<OperationStatus>,
}

impl VideoOperation {
    /// URI of the first generated video, if the operation carries one.
    pub fn video_uri(&self) -> Option<&str> {
        let response = self.response.as_ref()?;
        let samples = response
            .generate_video_response
            .as_ref()
            .map(|r| r.generated_samples.as_slice())
            .or(response.generated_videos.as_deref())?;
        samples
            .first()
            .and_then(|s| s.video.as_ref())
            .and_then(|v| v.uri.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
    #[serde(default)]
    pub generated_videos: Option<Vec<GeneratedSample>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationStatus {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: String,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: OperationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_serializes_camel_case_inline_data() {
        let part = Part::inline("image/jpeg", "AAAA".to_string());
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["inlineData"]["data"], "AAAA");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_first_inline_image_skips_text_parts() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here is your twin"},
                    {"inlineData": {"mimeType": "image/png", "data": "Zmlyc3Q="}},
                    {"inlineData": {"mimeType": "image/png", "data": "c2Vjb25k"}}
                ]}
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let image = response.first_inline_image().unwrap();
        assert_eq!(image.data, "Zmlyc3Q=");
    }

    #[test]
    fn test_first_inline_image_none_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.first_inline_image().is_none());
    }

    #[test]
    fn test_operation_pending_has_no_uri() {
        let json = r#"{"name": "models/veo/operations/op1"}"#;
        let op: VideoOperation = serde_json::from_str(json).unwrap();
        assert!(!op.done);
        assert!(op.video_uri().is_none());
    }

    #[test]
    fn test_operation_video_uri_from_generate_video_response() {
        let json = r#"{
            "name": "models/veo/operations/op1",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [
                {"video": {"uri": "https://files.example/v1?alt=media"}}
            ]}}
        }"#;
        let op: VideoOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.video_uri(), Some("https://files.example/v1?alt=media"));
    }

    #[test]
    fn test_operation_video_uri_from_generated_videos() {
        let json = r#"{
            "name": "op2",
            "done": true,
            "response": {"generatedVideos": [{"video": {"uri": "https://files.example/v2"}}]}
        }"#;
        let op: VideoOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.video_uri(), Some("https://files.example/v2"));
    }

    #[test]
    fn test_video_request_serialization() {
        let request = PredictVideoRequest {
            instances: vec![VideoInstance {
                prompt: "walk".to_string(),
                image: VideoImage {
                    bytes_base64_encoded: "AAAA".to_string(),
                    mime_type: "image/png".to_string(),
                },
            }],
            parameters: VideoParameters {
                sample_count: 1,
                resolution: "720p".to_string(),
                aspect_ratio: "9:16".to_string(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["instances"][0]["image"]["bytesBase64Encoded"], "AAAA");
        assert_eq!(json["parameters"]["sampleCount"], 1);
        assert_eq!(json["parameters"]["aspectRatio"], "9:16");
    }
}
