//! Concrete LLM provider backends.

pub mod bedrock;
