//! aceprep-providers: hosted model clients.
//!
//! Implements the `LlmProvider` trait for Gemini, Anthropic and
//! OpenAI-compatible endpoints, plus a scripted mock, and loads the
//! `aceprep.toml` configuration that selects between them.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{
    create_provider, load_config, load_config_from, AceprepConfig, MockRoute, ProviderConfig,
};
pub use error::ProviderError;
