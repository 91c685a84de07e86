//! twin-studio library crate.
//!
//! Digital twin image generation and image-to-video animation against the
//! Gemini API, plus the interactive studio session that drives them.

pub mod category;
pub mod config;
pub mod gemini;
pub mod media;
pub mod prompt;
pub mod studio;
pub mod supervisor;
