//! wuprobe-client: monitoring server REST client
//!
//! Logs in once per run and submits a single passive check result.
//!
//! # Example
//!
//! ```no_run
//! use wuprobe_api::{ProbeResult, StatusCode};
//! use wuprobe_client::HttpClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("https://opsview.example.com")?;
//!
//! let session = client.authenticate("admin", "secret").await?;
//! let result = ProbeResult::new(StatusCode::Ok, "OK - no pending updates.");
//! client
//!     .submit("web01.example.com", "Windows Updates", &session, &result)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;

pub use error::{ClientError, Result};
pub use http::{HttpClient, Session};
