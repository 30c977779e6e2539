//! Financial insight cards.

use serde::{Deserialize, Serialize};

/// One pre-formatted insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Card heading.
    pub title: String,
    /// Highlighted value, already formatted by the backend.
    pub value: String,
    /// Supporting text.
    #[serde(default)]
    pub description: String,
    /// Icon class.
    #[serde(default)]
    pub icon: String,
}
