//! AI adapter module. Implements QueryTranslatorPort for LLM integration.
//!
//! Provides OpenAI-compatible translator and mock translator for offline use.

pub mod mock_adapter;
pub mod openai_adapter;

pub use mock_adapter::MockTranslator;
pub use openai_adapter::OpenAiTranslator;
