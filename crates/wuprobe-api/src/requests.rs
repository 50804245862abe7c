//! Request bodies for the monitoring server REST API

use serde::{Deserialize, Serialize};

use crate::types::ProbeResult;

/// `POST rest/login` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST rest/detail` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStateRequest {
    pub set_state: SetState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetState {
    /// Status code as a decimal string ("0".."3")
    pub result: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfdata: Option<String>,
}

impl From<&ProbeResult> for SetStateRequest {
    fn from(result: &ProbeResult) -> Self {
        Self {
            set_state: SetState {
                result: result.status.exit_code().to_string(),
                output: result.message.clone(),
                perfdata: result.perfdata.map(|p| p.to_string()),
            },
        }
    }
}
