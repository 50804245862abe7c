//! wuprobe-core: Windows Update posture check
//!
//! Classifies the pending update inventory, maps it to a monitoring status
//! under a fixed priority order, bounds the message for the transport and
//! drives one authenticate-and-submit round against the monitoring server.

pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod probe;
pub mod reporter;
pub mod resolve;

pub use classify::{Classification, classify};
pub use config::ProbeConfig;
pub use error::ProbeError;
pub use format::{MESSAGE_LIMIT, PERFDATA_RESERVE, TRANSPORT_LIMIT, format, transliterate, truncate};
pub use probe::{Probe, ProbeOutcome};
pub use reporter::{Credentials, OpsviewReporter, ReportTarget, Reporter};
pub use resolve::{Resolution, Rule, resolve};
