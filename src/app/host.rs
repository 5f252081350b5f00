//! Capabilities the embedding host gives the UI controller

use crate::error::Result;
use crate::gateway::CallToolResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a log entry sent to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic detail
    Debug,
    /// Normal progress
    Info,
    /// Something unexpected that did not fail
    Warning,
    /// A failed operation
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Screen area the host keeps clear (notches, toolbars), in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SafeAreaInsets {
    /// Top inset
    pub top: f64,
    /// Right inset
    pub right: f64,
    /// Bottom inset
    pub bottom: f64,
    /// Left inset
    pub left: f64,
}

/// Rendering context supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostContext {
    /// Insets to pad the container with
    #[serde(default)]
    pub safe_area_insets: Option<SafeAreaInsets>,
}

/// Host capability object
///
/// Tool calls are asynchronous and may fail at the transport level; the
/// remaining calls are fire-and-forget.
#[async_trait]
pub trait AppHost: Send + Sync {
    /// Invoke a named server tool
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult>;

    /// Ask the host to open an external link
    fn open_link(&self, url: &str);

    /// Emit a log entry through the host
    fn send_log(&self, level: LogLevel, data: &str);

    /// Current rendering context
    fn host_context(&self) -> HostContext {
        HostContext::default()
    }
}
