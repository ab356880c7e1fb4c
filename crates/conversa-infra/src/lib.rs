//! Infrastructure implementations for Conversa.
//!
//! Concrete backends for the seams defined in conversa-core: the AWS
//! Bedrock model provider and the configuration loader.

pub mod config;
pub mod llm;
