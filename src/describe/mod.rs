//! # Description Module
//!
//! Per-tile caption requests against an external multimodal service.

pub mod client;

// Re-export commonly used types for convenience
pub use client::{
    API_KEY_VAR, DEFAULT_MODEL, DESCRIBE_INSTRUCTION, Describer, EMPTY_RESPONSE_PLACEHOLDER,
    FAILURE_PLACEHOLDER, GeminiDescriber, describe_or_placeholder,
};
