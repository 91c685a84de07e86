//! GeminiClient - handles communication with the Gemini generative-language API.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::GenerationError;
use super::retry::{
    calculate_backoff, is_transient_network_error, parse_retry_after, PollPolicy,
    DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX, DEFAULT_MAX_RETRIES, DEFAULT_NETWORK_RETRIES,
};
use super::types::{
    ApiErrorBody, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ImageConfig, Part, PredictVideoRequest, VideoImage, VideoInstance, VideoOperation,
    VideoParameters,
};
use crate::config::Config;
use crate::media::{ReferenceImage, MAX_REFERENCE_IMAGES};
use crate::prompt::{twin_instruction, validate_prompt};

/// Default base URL for the Gemini API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for twin image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Model used for image-to-video generation.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Progress messages reported while a video is generated.
pub const PROGRESS_INITIATING: &str = "Initiating video generation...";
pub const PROGRESS_PROCESSING: &str = "Processing video (this may take a moment)...";
pub const PROGRESS_RENDERING: &str = "Still rendering...";
pub const PROGRESS_DOWNLOADING: &str = "Downloading video...";

/// Timeout for a single generate/poll request. Image generation can take a while.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
const HTTP_STATUS_BAD_REQUEST: u16 = 400;
const HTTP_STATUS_FORBIDDEN: u16 = 403;

/// Keywords that indicate a safety/content policy rejection in error messages.
const CONTENT_POLICY_KEYWORDS: &[&str] = &[
    "content policy",
    "policy violation",
    "safety",
    "blocked",
    "prohibited",
    "responsible ai",
    "violates",
];

fn is_content_policy_error(error_text: &str) -> bool {
    let lower = error_text.to_lowercase();
    CONTENT_POLICY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Pull the human-readable message out of a Google error envelope, if present.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string())
}

/// Append the API credential as a percent-encoded `key` query parameter.
pub fn with_key_param(uri: &str, api_key: &str) -> Result<reqwest::Url, GenerationError> {
    let mut url = reqwest::Url::parse(uri)
        .map_err(|e| GenerationError::InvalidVideoUri(e.to_string()))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

/// A decoded media payload returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMedia {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Client for the Gemini image and Veo video endpoints.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    image_model: String,
    video_model: String,
    image_config: ImageConfig,
    video_parameters: VideoParameters,
    poll_policy: PollPolicy,
    retry_submit: bool,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client from the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MissingApiKey` if no credential was resolved.
    pub fn from_config(api_key: String, config: &Config) -> Result<Self, GenerationError> {
        let mut client = Self::with_base_url(api_key, config.api.base_url.clone())?;
        client.image_model = config.api.image_model.clone();
        client.video_model = config.api.video_model.clone();
        client.image_config = ImageConfig {
            aspect_ratio: config.image.aspect_ratio.clone(),
            image_size: config.image.image_size.clone(),
        };
        client.video_parameters = VideoParameters {
            sample_count: 1,
            resolution: config.video.resolution.clone(),
            aspect_ratio: config.video.aspect_ratio.clone(),
        };
        client.poll_policy = config.video.poll_policy();
        client.retry_submit = config.video.retry_submit;
        Ok(client)
    }

    /// Create a client against the public Gemini endpoint.
    pub fn with_api_key(api_key: String) -> Result<Self, GenerationError> {
        Self::with_base_url(api_key, GEMINI_API_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            image_config: ImageConfig {
                aspect_ratio: "3:4".to_string(),
                image_size: "1K".to_string(),
            },
            video_parameters: VideoParameters {
                sample_count: 1,
                resolution: "720p".to_string(),
                aspect_ratio: "9:16".to_string(),
            },
            poll_policy: PollPolicy::default(),
            retry_submit: false,
            http_client,
        })
    }

    /// Replace the poll policy used by [`GeminiClient::generate_video`].
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    pub fn video_model(&self) -> &str {
        &self.video_model
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    /// Map a non-success response to a `GenerationError`.
    async fn error_for_response(response: reqwest::Response) -> GenerationError {
        let status = response.status();

        if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(&response);
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Rate limit exceeded".to_string());
            log::warn!(
                "Rate limited by Gemini API. Retry-After: {:?} seconds",
                retry_after_secs
            );
            return GenerationError::RateLimit {
                message: api_error_message(&error_text),
                retry_after_secs,
            };
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = api_error_message(&error_text);

        if (status.as_u16() == HTTP_STATUS_BAD_REQUEST || status.as_u16() == HTTP_STATUS_FORBIDDEN)
            && is_content_policy_error(&message)
        {
            log::warn!("Request rejected by content policy: {}", message);
            return GenerationError::ContentPolicyViolation { message };
        }

        GenerationError::Api(format!("request failed with status {}: {}", status, message))
    }

    /// Generate a twin image from 1 to 4 reference photos and a composed prompt.
    ///
    /// The first inline image part of the response is returned; any other
    /// parts are discarded.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidImageCount` for 0 or more than 4 images,
    /// `GenerationError::NoImageReturned` if the model produced no image, or the
    /// transport/API error otherwise. Nothing is retried.
    pub async fn generate_twin(
        &self,
        images: &[ReferenceImage],
        prompt: &str,
    ) -> Result<GeneratedMedia, GenerationError> {
        if images.is_empty() || images.len() > MAX_REFERENCE_IMAGES {
            return Err(GenerationError::InvalidImageCount {
                count: images.len(),
                max: MAX_REFERENCE_IMAGES,
            });
        }
        validate_prompt(prompt)?;

        let mut parts: Vec<Part> = images
            .iter()
            .map(|image| Part::inline(image.mime_type.clone(), image.to_base64()))
            .collect();
        parts.push(Part::text(twin_instruction(prompt)));

        let request_body = GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: self.image_config.clone(),
            },
        };

        log::info!(
            "Requesting twin image from {} with {} reference image(s)",
            self.image_model,
            images.len()
        );

        let response = self
            .http_client
            .post(self.model_url(&self.image_model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error = Self::error_for_response(response).await;
            log::error!("Twin image generation failed: {}", error);
            return Err(error);
        }

        let body: GenerateContentResponse = response.json().await?;
        let Some(inline) = body.first_inline_image() else {
            if let Some(reason) = body.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_ref()) {
                log::warn!("Image prompt blocked: {}", reason);
            }
            return Err(GenerationError::NoImageReturned);
        };

        let bytes = BASE64.decode(inline.data.as_bytes())?;
        let mime_type = if inline.mime_type.is_empty() {
            "image/png".to_string()
        } else {
            inline.mime_type.clone()
        };
        log::info!("Twin image received ({} bytes, {})", bytes.len(), mime_type);

        Ok(GeneratedMedia { bytes, mime_type })
    }

    /// Submit an image-to-video request. The returned operation may already be done.
    pub async fn submit_video(
        &self,
        image: &ReferenceImage,
        prompt: &str,
    ) -> Result<VideoOperation, GenerationError> {
        validate_prompt(prompt)?;

        let request_body = PredictVideoRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
                image: VideoImage {
                    bytes_base64_encoded: image.to_base64(),
                    mime_type: image.mime_type.clone(),
                },
            }],
            parameters: self.video_parameters.clone(),
        };

        let response = self
            .http_client
            .post(self.model_url(&self.video_model, "predictLongRunning"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_response(response).await);
        }

        let operation: VideoOperation = response.json().await?;
        log::info!("Video operation submitted: {}", operation.name);
        Ok(operation)
    }

    /// Submit a video request, retrying transient network errors and rate limits
    /// with the default backoff.
    pub async fn submit_video_with_retry(
        &self,
        image: &ReferenceImage,
        prompt: &str,
    ) -> Result<VideoOperation, GenerationError> {
        self.submit_video_with_retry_config(
            image,
            prompt,
            DEFAULT_NETWORK_RETRIES,
            DEFAULT_MAX_RETRIES,
            DEFAULT_BACKOFF_BASE,
            DEFAULT_BACKOFF_MAX,
        )
        .await
    }

    /// Submit a video request with custom retry limits for network errors and
    /// rate limits.
    pub async fn submit_video_with_retry_config(
        &self,
        image: &ReferenceImage,
        prompt: &str,
        network_retries: u32,
        rate_limit_retries: u32,
        backoff_base: Duration,
        backoff_max: Duration,
    ) -> Result<VideoOperation, GenerationError> {
        let mut network_attempt = 0u32;
        let mut rate_limit_attempt = 0u32;

        loop {
            match self.submit_video(image, prompt).await {
                Ok(operation) => return Ok(operation),

                Err(GenerationError::Http(ref http_err)) if is_transient_network_error(http_err) => {
                    network_attempt += 1;
                    if network_attempt > network_retries {
                        log::error!(
                            "Network error after {} attempts. Giving up. Error: {}",
                            network_attempt,
                            http_err
                        );
                        return Err(GenerationError::NetworkError {
                            message: http_err.to_string(),
                            attempts: network_attempt,
                        });
                    }

                    let delay = calculate_backoff(network_attempt - 1, backoff_base, backoff_max);
                    log::warn!(
                        "Network error (attempt {}/{}): {}. Retrying in {:?}...",
                        network_attempt,
                        network_retries + 1,
                        http_err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }

                Err(GenerationError::RateLimit {
                    message,
                    retry_after_secs,
                }) => {
                    rate_limit_attempt += 1;
                    if rate_limit_attempt > rate_limit_retries {
                        log::error!(
                            "Rate limit exceeded after {} attempts. Giving up.",
                            rate_limit_attempt
                        );
                        return Err(GenerationError::RateLimit {
                            message,
                            retry_after_secs,
                        });
                    }

                    let delay = match retry_after_secs {
                        Some(secs) => Duration::from_secs(secs).min(backoff_max),
                        None => calculate_backoff(rate_limit_attempt - 1, backoff_base, backoff_max),
                    };
                    log::info!(
                        "Rate limited (attempt {}/{}). Retrying in {:?}...",
                        rate_limit_attempt,
                        rate_limit_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }

                Err(e) => return Err(e),
            }
        }
    }

    /// Fetch the latest state of a long-running operation by name.
    pub async fn poll_operation(&self, name: &str) -> Result<VideoOperation, GenerationError> {
        let url = format!("{}/v1beta/{}", self.base_url, name.trim_start_matches('/'));

        let response = self
            .http_client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_response(response).await);
        }

        let operation: VideoOperation = response.json().await?;
        log::debug!("Operation {} done={}", operation.name, operation.done);
        Ok(operation)
    }

    /// Download a finished video into memory.
    ///
    /// The credential is appended to `uri` as a `key` query parameter, so
    /// transport errors are stripped of their URL before they surface.
    pub async fn download_video(&self, uri: &str) -> Result<GeneratedMedia, GenerationError> {
        let response = self
            .http_client
            .get(with_key_param(uri, &self.api_key)?)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            log::error!("Video download failed with status {}", status);
            return Err(GenerationError::DownloadFailed { status });
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or("video/mp4")
            .to_string();

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk.map_err(reqwest::Error::without_url)?);
        }
        log::info!("Video downloaded ({} bytes)", bytes.len());

        Ok(GeneratedMedia { bytes, mime_type })
    }

    /// Animate an image into a short video using the client's poll policy.
    ///
    /// `on_progress` receives a status string before submission, after
    /// submission, before every re-poll and before the download.
    pub async fn generate_video<F>(
        &self,
        image: &ReferenceImage,
        prompt: &str,
        on_progress: F,
    ) -> Result<GeneratedMedia, GenerationError>
    where
        F: FnMut(&str),
    {
        self.generate_video_with_policy(image, prompt, self.poll_policy, &CancellationToken::new(), on_progress)
            .await
    }

    /// Animate an image into a short video under an explicit poll policy.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Timeout` when the policy is exhausted before the
    /// operation reports done, `GenerationError::Cancelled` if `cancel` fires,
    /// `GenerationError::OperationFailed` if the operation carries an error,
    /// `GenerationError::MissingVideoUri` if it finished without a video and
    /// `GenerationError::DownloadFailed` if the payload could not be fetched.
    pub async fn generate_video_with_policy<F>(
        &self,
        image: &ReferenceImage,
        prompt: &str,
        policy: PollPolicy,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<GeneratedMedia, GenerationError>
    where
        F: FnMut(&str),
    {
        log::info!("Starting video generation for prompt: {}", prompt);
        on_progress(PROGRESS_INITIATING);

        let mut operation = if self.retry_submit {
            self.submit_video_with_retry(image, prompt).await?
        } else {
            self.submit_video(image, prompt).await?
        };
        on_progress(PROGRESS_PROCESSING);

        let started = Instant::now();
        let mut attempts = 0u32;
        while !operation.done {
            if !policy.allows(attempts, started.elapsed()) {
                log::error!("Video operation {} timed out after {} polls", operation.name, attempts);
                return Err(GenerationError::Timeout { attempts });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    log::warn!("Video generation cancelled after {} polls", attempts);
                    return Err(GenerationError::Cancelled);
                }
                _ = tokio::time::sleep(policy.interval) => {}
            }

            on_progress(PROGRESS_RENDERING);
            operation = self.poll_operation(&operation.name).await?;
            attempts += 1;
        }

        if let Some(error) = operation.error.as_ref() {
            log::error!("Video generation failed: {}", error.message);
            return Err(GenerationError::OperationFailed(error.message.clone()));
        }

        let uri = operation
            .video_uri()
            .ok_or(GenerationError::MissingVideoUri)?
            .to_string();
        log::info!("Video generation complete after {} polls", attempts);

        on_progress(PROGRESS_DOWNLOADING);
        self.download_video(&uri).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_creates_client() {
        let client = GeminiClient::with_api_key("test-api-key".to_string()).unwrap();
        assert_eq!(client.api_key(), "test-api-key");
        assert_eq!(client.base_url(), GEMINI_API_BASE_URL);
        assert_eq!(client.image_model(), DEFAULT_IMAGE_MODEL);
        assert_eq!(client.video_model(), DEFAULT_VIDEO_MODEL);
    }

    #[test]
    fn test_empty_key_returns_error() {
        assert!(matches!(
            GeminiClient::with_api_key(String::new()),
            Err(GenerationError::MissingApiKey)
        ));
        assert!(matches!(
            GeminiClient::with_base_url("  ".to_string(), "http://localhost".to_string()),
            Err(GenerationError::MissingApiKey)
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            GeminiClient::with_base_url("k".to_string(), "http://localhost:8080/".to_string()).unwrap();
        assert_eq!(
            client.model_url("m", "generateContent"),
            "http://localhost:8080/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_from_config_applies_settings() {
        let mut config = Config::default();
        config.api.video_model = "veo-custom".to_string();
        config.video.poll_interval_secs = 1;
        config.video.max_polls = 7;
        let client = GeminiClient::from_config("k".to_string(), &config).unwrap();
        assert_eq!(client.video_model(), "veo-custom");
        assert_eq!(client.poll_policy().max_attempts, 7);
        assert_eq!(client.poll_policy().interval, Duration::from_secs(1));
    }

    #[test]
    fn test_with_key_param() {
        assert_eq!(
            with_key_param("https://f.example/v?alt=media", "abc").unwrap().as_str(),
            "https://f.example/v?alt=media&key=abc"
        );
        assert_eq!(
            with_key_param("https://f.example/v", "abc").unwrap().as_str(),
            "https://f.example/v?key=abc"
        );
    }

    #[test]
    fn test_with_key_param_encodes_reserved_characters() {
        let url = with_key_param("https://f.example/v?alt=media", "a&b=c d#e").unwrap();
        assert_eq!(url.as_str(), "https://f.example/v?alt=media&key=a%26b%3Dc+d%23e");
        let key = url.query_pairs().find(|(k, _)| k == "key").map(|(_, v)| v.into_owned());
        assert_eq!(key.as_deref(), Some("a&b=c d#e"));
        assert_eq!(url.query_pairs().count(), 2);
    }

    #[test]
    fn test_with_key_param_rejects_relative_uri() {
        assert!(matches!(
            with_key_param("files/v", "abc"),
            Err(GenerationError::InvalidVideoUri(_))
        ));
    }

    #[test]
    fn test_content_policy_detection() {
        assert!(is_content_policy_error("Request blocked by SAFETY filters"));
        assert!(!is_content_policy_error("Invalid argument: imageSize"));
    }

    #[test]
    fn test_api_error_message_extracts_envelope() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message("plain text"), "plain text");
    }
}
