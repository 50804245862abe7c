//! Probe orchestration
//!
//! One run is a straight line: reboot flag, inventory, classification,
//! resolution, formatting, login, submission. Every path that gets past
//! login submits exactly once; nothing is retried.

use std::sync::Arc;

use tracing::{error, info, instrument};
use wuprobe_api::{ProbeResult, StatusCode};
use wuprobe_inventory::{InventoryError, UpdateSource};

use crate::classify::classify;
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::format::{MESSAGE_LIMIT, format, transliterate, truncate};
use crate::reporter::Reporter;
use crate::resolve::resolve;

/// Result of one run plus how its delivery went
#[derive(Debug)]
pub struct ProbeOutcome {
    /// Locally determined result
    pub result: ProbeResult,
    /// `Err(Auth)` when nothing was sent, `Err(Submit)` when sending failed
    pub submitted: Result<(), ProbeError>,
}

impl ProbeOutcome {
    /// Process exit code
    ///
    /// The local status is authoritative even when submission failed; only a
    /// failed login, which aborts the run, turns it into UNKNOWN.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.status().exit_code()
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.submitted {
            Err(ProbeError::Auth(_)) => StatusCode::Unknown,
            _ => self.result.status,
        }
    }

    /// Single line for stdout
    #[must_use]
    pub fn plugin_output(&self) -> String {
        match &self.submitted {
            Err(e @ ProbeError::Auth(_)) => format!("UNKNOWN - {e}"),
            _ => self.result.plugin_output(),
        }
    }
}

/// Windows Update posture probe
pub struct Probe {
    source: Arc<dyn UpdateSource>,
    reporter: Arc<dyn Reporter>,
    config: ProbeConfig,
}

impl Probe {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        reporter: Arc<dyn Reporter>,
        config: ProbeConfig,
    ) -> Self {
        Self {
            source,
            reporter,
            config,
        }
    }

    /// Run the check and report it
    #[instrument(skip(self), fields(source = self.source.source_type()))]
    pub async fn run(&self) -> ProbeOutcome {
        let result = self.evaluate().await;
        info!(status = %result.status, message = %result.message, "check evaluated");

        let submitted = self.report(&result).await;
        ProbeOutcome { result, submitted }
    }

    /// Determine the result without contacting the monitoring server
    pub async fn evaluate(&self) -> ProbeResult {
        match self.source.reboot_pending().await {
            Ok(true) => {
                info!("reboot pending, skipping inventory");
                format(resolve(&self.config, true, None), None)
            }
            Ok(false) => match self.source.pending_updates().await {
                Ok(updates) => {
                    let classification = classify(&updates);
                    info!(
                        critical = classification.critical,
                        optional = classification.optional,
                        hidden = classification.hidden,
                        "inventory classified"
                    );
                    let resolution = resolve(&self.config, false, Some(&classification));
                    format(resolution, Some(&classification))
                }
                Err(e) => Self::inventory_failure(&e),
            },
            Err(e) => Self::inventory_failure(&e),
        }
    }

    fn inventory_failure(e: &InventoryError) -> ProbeResult {
        error!(error = %e, "inventory unavailable");
        let message = format!("UNKNOWN - {}", ProbeError::Inventory(e.clone()));
        ProbeResult::new(
            StatusCode::Unknown,
            truncate(&transliterate(&message), MESSAGE_LIMIT),
        )
    }

    async fn report(&self, result: &ProbeResult) -> Result<(), ProbeError> {
        let session = match self.reporter.authenticate().await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "authentication failed, result not submitted");
                return Err(ProbeError::Auth(e));
            }
        };

        match self.reporter.submit(&session, result).await {
            Ok(()) => {
                info!(status = %result.status, "result submitted");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "submission failed, keeping local status");
                Err(ProbeError::Submit(e))
            }
        }
    }
}
