//! wuprobe-inventory: Windows Update inventory
//!
//! Provides the [`UpdateSource`] seam the probe consumes, a PowerShell-backed
//! implementation querying the Windows Update Agent, and a file cache that
//! keeps the last inventory for a configurable freshness window.

pub mod cache;
pub mod error;
pub mod powershell;
pub mod source;
pub mod windows;

pub use cache::{CachedSource, DEFAULT_EXPIRY_HOURS, InventorySnapshot};
pub use error::InventoryError;
pub use powershell::{CommandOutput, PowerShell};
pub use source::UpdateSource;
pub use windows::WindowsUpdateSource;
