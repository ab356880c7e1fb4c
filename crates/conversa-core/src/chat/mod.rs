//! Chat orchestration.

pub mod service;

pub use service::{ChatConfig, ChatService};
