//! Error types for Gemini image and video generation.

/// Errors that can occur while generating twin images or videos.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited: {message}")]
    RateLimit {
        /// Human-readable rate limit message
        message: String,
        /// Retry-After header value in seconds, if provided
        retry_after_secs: Option<u64>,
    },

    #[error("Network error: {message} (after {attempts} attempts)")]
    NetworkError { message: String, attempts: u32 },

    #[error("Content policy violation: {message}")]
    ContentPolicyViolation { message: String },

    #[error("Expected 1 to {max} reference images, got {count}")]
    InvalidImageCount { count: usize, max: usize },

    #[error("No image data returned from model.")]
    NoImageReturned,

    #[error("Video generation completed but no URI returned.")]
    MissingVideoUri,

    #[error("Video generation failed: {0}")]
    OperationFailed(String),

    #[error("Invalid video URI: {0}")]
    InvalidVideoUri(String),

    #[error("Failed to download generated video file (status {status}).")]
    DownloadFailed { status: u16 },

    #[error("Video generation did not finish after {attempts} polls")]
    Timeout { attempts: u32 },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Another generation is already in progress")]
    Busy,

    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(GenerationError::MissingApiKey.to_string(), "API key not configured");
        assert_eq!(
            GenerationError::NoImageReturned.to_string(),
            "No image data returned from model."
        );
        assert_eq!(
            GenerationError::Timeout { attempts: 3 }.to_string(),
            "Video generation did not finish after 3 polls"
        );
        assert_eq!(
            GenerationError::InvalidImageCount { count: 5, max: 4 }.to_string(),
            "Expected 1 to 4 reference images, got 5"
        );
    }

    #[test]
    fn test_download_failed_includes_status() {
        let error = GenerationError::DownloadFailed { status: 403 };
        assert!(error.to_string().contains("403"));
    }
}
