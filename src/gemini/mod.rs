//! Gemini image and Veo video generation.
//!
//! Twin images come back from a single synchronous `generateContent` call.
//! Videos are long-running operations: submit, poll under a bounded
//! [`PollPolicy`], then download the finished payload with the credential.

mod client;
mod error;
pub mod retry;
pub mod types;

pub use client::{
    with_key_param, GeminiClient, GeneratedMedia, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL,
    GEMINI_API_BASE_URL, PROGRESS_DOWNLOADING, PROGRESS_INITIATING, PROGRESS_PROCESSING,
    PROGRESS_RENDERING,
};
pub use error::GenerationError;
pub use retry::PollPolicy;
pub use types::VideoOperation;
