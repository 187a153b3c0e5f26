//! Codec configuration

use serde::{Deserialize, Serialize};

/// Limits and diagnostics for one encoder or decoder.
///
/// The defaults impose no limits, matching a peer that trusts its
/// counterpart. A controller decoding payloads from a sandboxed process
/// should set both limits.
///
/// # Example
///
/// ```
/// use stackwire::CodecConfig;
///
/// let config: CodecConfig = serde_json::from_str(r#"{ "max_depth": 64 }"#).unwrap();
/// assert_eq!(config.max_depth, Some(64));
/// assert_eq!(config.max_payload, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum table nesting depth (a top-level table is depth 1)
    pub max_depth: Option<usize>,

    /// Maximum payload size the decoder accepts, in bytes
    pub max_payload: Option<usize>,

    /// Whether to emit a trace event per value
    pub trace: bool,
}

impl CodecConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with a table nesting limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Default::default()
        }
    }

    /// Set the payload size limit (builder pattern).
    pub fn max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = Some(max_payload);
        self
    }

    /// Enable per-value trace events (builder pattern).
    pub fn traced(mut self) -> Self {
        self.trace = true;
        self
    }
}
