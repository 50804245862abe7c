//! Probe value types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monitoring status of a probe run
///
/// The discriminants double as the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl StatusCode {
    /// Process exit code (0=OK, 1=WARNING, 2=CRITICAL, 3=UNKNOWN)
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Warning => 1,
            StatusCode::Critical => 2,
            StatusCode::Unknown => 3,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Ok => write!(f, "OK"),
            StatusCode::Warning => write!(f, "WARNING"),
            StatusCode::Critical => write!(f, "CRITICAL"),
            StatusCode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Error returned when a status name cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status '{0}' (expected ok, warning, critical, unknown or 0-3)")]
pub struct ParseStatusError(pub String);

impl FromStr for StatusCode {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ok" | "0" => Ok(StatusCode::Ok),
            "warning" | "warn" | "1" => Ok(StatusCode::Warning),
            "critical" | "crit" | "2" => Ok(StatusCode::Critical),
            "unknown" | "3" => Ok(StatusCode::Unknown),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A pending update as reported by the inventory source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Update title
    pub title: String,
    /// Hidden by an administrator
    #[serde(default)]
    pub is_hidden: bool,
    /// Would be installed automatically if left unattended
    #[serde(default)]
    pub is_auto_selectable: bool,
}

impl UpdateRecord {
    /// Create a visible, non auto-selectable update
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_hidden: false,
            is_auto_selectable: false,
        }
    }

    /// Mark as hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    /// Mark as auto-selectable
    #[must_use]
    pub fn auto_selectable(mut self) -> Self {
        self.is_auto_selectable = true;
        self
    }
}

/// Performance data attached to a result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfData {
    pub critical: u32,
    pub optional: u32,
    pub hidden: u32,
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "critical={};optional={};hidden={}",
            self.critical, self.optional, self.hidden
        )
    }
}

/// Final outcome of one probe run, as sent to the monitoring server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfdata: Option<PerfData>,
}

impl ProbeResult {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            perfdata: None,
        }
    }

    #[must_use]
    pub fn with_perfdata(mut self, perfdata: PerfData) -> Self {
        self.perfdata = Some(perfdata);
        self
    }

    /// Plugin output line: `message|perfdata`, or just the message
    #[must_use]
    pub fn plugin_output(&self) -> String {
        match &self.perfdata {
            Some(perf) => format!("{}|{perf}", self.message),
            None => self.message.clone(),
        }
    }
}
