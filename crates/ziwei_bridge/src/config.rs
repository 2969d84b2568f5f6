//! Bridge configuration

use serde::{Deserialize, Serialize};
use ziwei_core::EscapeStyle;

/// How pushed messages are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    /// Parse the message once and read its top-level `status`/`kind` tag.
    #[default]
    Structural,
    /// Any message containing the readiness marker is a readiness signal.
    /// A chart that happens to contain the marker is misrouted.
    Substring,
}

/// What happens to a calculation submitted while another is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// Refuse with [`SubmitError::Busy`](crate::SubmitError::Busy).
    #[default]
    Reject,
    /// Dispatch anyway. The earlier caller resolves with no result and the
    /// next pushed chart goes to the newest caller.
    Overwrite,
    /// Hold the request and dispatch it once the current one resolves.
    Queue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Substring marking a readiness message in [`ClassifierMode::Substring`].
    pub readiness_marker: String,
    pub classifier: ClassifierMode,
    pub submit_policy: SubmitPolicy,
    pub escape_style: EscapeStyle,
    /// Number of lookup latencies kept for the rolling average.
    pub latency_window: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            readiness_marker: r#""status":"ready""#.to_string(),
            classifier: ClassifierMode::default(),
            submit_policy: SubmitPolicy::default(),
            escape_style: EscapeStyle::default(),
            latency_window: 32,
        }
    }
}
