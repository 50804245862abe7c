//! Result delivery to the monitoring server

use std::fmt;

use async_trait::async_trait;
use wuprobe_api::ProbeResult;
use wuprobe_client::{ClientError, HttpClient, Session};

/// Delivers one probe result per run
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Obtain a fresh session for this run
    async fn authenticate(&self) -> Result<Session, ClientError>;

    /// Submit the result using `session`
    async fn submit(&self, session: &Session, result: &ProbeResult) -> Result<(), ClientError>;
}

/// Login credentials for the monitoring server
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Host and service the result is recorded against
#[derive(Debug, Clone)]
pub struct ReportTarget {
    pub hostname: String,
    pub service: String,
}

/// [`Reporter`] for the Opsview REST API
#[derive(Debug, Clone)]
pub struct OpsviewReporter {
    client: HttpClient,
    credentials: Credentials,
    target: ReportTarget,
}

impl OpsviewReporter {
    #[must_use]
    pub fn new(client: HttpClient, credentials: Credentials, target: ReportTarget) -> Self {
        Self {
            client,
            credentials,
            target,
        }
    }
}

#[async_trait]
impl Reporter for OpsviewReporter {
    async fn authenticate(&self) -> Result<Session, ClientError> {
        self.client
            .authenticate(&self.credentials.username, &self.credentials.password)
            .await
    }

    async fn submit(&self, session: &Session, result: &ProbeResult) -> Result<(), ClientError> {
        self.client
            .submit(&self.target.hostname, &self.target.service, session, result)
            .await
    }
}
