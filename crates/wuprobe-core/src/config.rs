//! Severity configuration for the status resolver

use serde::{Deserialize, Serialize};
use wuprobe_api::StatusCode;

/// Severities the resolver assigns to the configurable rows of its
/// decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Status when an installed update waits for a restart
    #[serde(default = "default_severity")]
    pub reboot_severity: StatusCode,
    /// Status when only optional updates are pending
    #[serde(default = "default_severity")]
    pub optional_severity: StatusCode,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            reboot_severity: default_severity(),
            optional_severity: default_severity(),
        }
    }
}

fn default_severity() -> StatusCode {
    StatusCode::Warning
}

impl ProbeConfig {
    #[must_use]
    pub fn with_reboot_severity(mut self, severity: StatusCode) -> Self {
        self.reboot_severity = severity;
        self
    }

    #[must_use]
    pub fn with_optional_severity(mut self, severity: StatusCode) -> Self {
        self.optional_severity = severity;
        self
    }
}
