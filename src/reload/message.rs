//! Live reload message protocol.
//!
//! JSON text frames from the dev server to the browser:
//!
//! - `{"type":"reload","reason":"content, feeds"}`: reload the page
//! - `{"type":"error","task":"styles","message":"..."}`: show an overlay
//! - `{"type":"clear"}`: remove the overlay
//! - `{"type":"connected","version":"0.1.0"}`: sent once per connection

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Error {
        task: String,
        message: String,
    },
    Clear,
    Connected {
        version: String,
    },
}

impl HotReloadMessage {
    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            task: task.into(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
