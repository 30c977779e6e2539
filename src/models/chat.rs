//! Chat endpoint payloads.

use serde::{Deserialize, Serialize};

/// Message sent to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User text.
    pub message: String,
}

/// Reply from the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant text.
    pub response: String,
}
