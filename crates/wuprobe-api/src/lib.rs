//! wuprobe-api: Shared value types
//!
//! Contains the status, update and result types passed between the inventory,
//! core and client crates, plus the request/response bodies of the monitoring
//! server's REST interface.

pub mod requests;
pub mod responses;
pub mod types;

pub use types::{ParseStatusError, PerfData, ProbeResult, StatusCode, UpdateRecord};
