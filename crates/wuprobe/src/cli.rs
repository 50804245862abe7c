//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use wuprobe_api::StatusCode;

/// Windows Update posture check reporting to an Opsview server
#[derive(Parser, Debug, Default)]
#[command(name = "wuprobe", version, about)]
pub struct Args {
    /// Config file (default: WUPROBE_CONFIG, then the standard locations)
    #[arg(short, long, env = "WUPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Monitoring server URL
    #[arg(short, long)]
    pub server: Option<String>,

    /// Monitoring server login
    #[arg(short, long)]
    pub username: Option<String>,

    /// Monitoring server password
    #[arg(short, long, env = "WUPROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Host the result is recorded against (default: local FQDN)
    #[arg(long)]
    pub hostname: Option<String>,

    /// Service the result is recorded against
    #[arg(long)]
    pub service: Option<String>,

    /// Status while a reboot is pending
    #[arg(long, value_name = "STATUS")]
    pub reboot_severity: Option<StatusCode>,

    /// Status while only optional updates are pending
    #[arg(long, value_name = "STATUS")]
    pub optional_severity: Option<StatusCode>,

    /// Inventory snapshot file
    #[arg(long)]
    pub cache_path: Option<PathBuf>,

    /// Hours an inventory snapshot stays fresh
    #[arg(long, value_name = "HOURS")]
    pub cache_expiry_hours: Option<i64>,

    /// Always query the update agent
    #[arg(long)]
    pub no_cache: bool,

    /// PowerShell executable
    #[arg(long)]
    pub powershell: Option<String>,

    /// Log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Rotate the log file once it exceeds this many bytes
    #[arg(long, value_name = "BYTES")]
    pub log_max_size: Option<u64>,
}
