//! Response bodies from the monitoring server REST API

use serde::{Deserialize, Serialize};

/// `POST rest/login` response
///
/// `token` is optional so a well-formed body without it can be reported
/// distinctly from a malformed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}
