//! Windows Update Agent inventory via PowerShell

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use wuprobe_api::UpdateRecord;

use crate::error::InventoryError;
use crate::powershell::PowerShell;
use crate::source::UpdateSource;

/// Lists every update not yet installed, hidden ones included.
///
/// `-InputObject @(...)` keeps the output a JSON array even for zero or one
/// update.
const PENDING_UPDATES_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$searcher = (New-Object -ComObject Microsoft.Update.Session).CreateUpdateSearcher()
$found = $searcher.Search("IsInstalled=0 and IsHidden=0 or IsInstalled=0 and IsHidden=1")
$rows = @($found.Updates | ForEach-Object {
    [pscustomobject]@{
        Title = [string]$_.Title
        IsHidden = [bool]$_.IsHidden
        AutoSelectOnWebSites = [bool]$_.AutoSelectOnWebSites
    }
})
ConvertTo-Json -Compress -InputObject $rows
"#;

const REBOOT_PENDING_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$agent = (New-Object -ComObject Microsoft.Update.SystemInfo).RebootRequired
$key = Test-Path 'HKLM:\SOFTWARE\Microsoft\Windows\CurrentVersion\WindowsUpdate\Auto Update\RebootRequired'
if ($agent -or $key) { 'true' } else { 'false' }
"#;

/// One row of the pending updates script
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    is_hidden: bool,
    #[serde(default)]
    auto_select_on_web_sites: bool,
}

impl From<UpdateRow> for UpdateRecord {
    fn from(row: UpdateRow) -> Self {
        UpdateRecord {
            title: row.title,
            is_hidden: row.is_hidden,
            is_auto_selectable: row.auto_select_on_web_sites,
        }
    }
}

/// Inventory source backed by the local Windows Update Agent
#[derive(Debug, Clone)]
pub struct WindowsUpdateSource {
    shell: PowerShell,
}

impl WindowsUpdateSource {
    #[must_use]
    pub fn new(shell: PowerShell) -> Self {
        Self { shell }
    }

    /// Parse the pending updates script output
    ///
    /// Accepts an array, a single object, or empty output (no updates).
    fn parse_updates(output: &str) -> Result<Vec<UpdateRecord>, InventoryError> {
        let output = output.trim();
        if output.is_empty() {
            return Ok(Vec::new());
        }

        let json: Value =
            serde_json::from_str(output).map_err(|e| InventoryError::ParseError(e.to_string()))?;

        let rows: Vec<UpdateRow> = match json {
            Value::Array(_) => serde_json::from_value(json),
            Value::Object(_) => serde_json::from_value(json).map(|row| vec![row]),
            Value::Null => Ok(Vec::new()),
            other => {
                return Err(InventoryError::ParseError(format!(
                    "expected update list, got {other}"
                )));
            }
        }
        .map_err(|e| InventoryError::ParseError(e.to_string()))?;

        Ok(rows.into_iter().map(UpdateRecord::from).collect())
    }

    fn parse_reboot_flag(output: &str) -> Result<bool, InventoryError> {
        match output.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(InventoryError::ParseError(format!(
                "unexpected reboot flag output: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl UpdateSource for WindowsUpdateSource {
    #[instrument(skip(self))]
    async fn pending_updates(&self) -> Result<Vec<UpdateRecord>, InventoryError> {
        debug!("searching windows update agent");

        let output = self.shell.run(PENDING_UPDATES_SCRIPT).await?;
        let updates = Self::parse_updates(&output.stdout)?;

        info!(count = updates.len(), duration = ?output.duration, "found pending updates");
        Ok(updates)
    }

    #[instrument(skip(self))]
    async fn reboot_pending(&self) -> Result<bool, InventoryError> {
        let output = self.shell.run(REBOOT_PENDING_SCRIPT).await?;
        let pending = Self::parse_reboot_flag(&output.stdout)?;

        debug!(pending, "checked reboot flag");
        Ok(pending)
    }

    fn source_type(&self) -> &'static str {
        "windows-update-agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_updates_array() {
        let output = r#"[{"Title":"2024-05 Cumulative Update (KB5037768)","IsHidden":false,"AutoSelectOnWebSites":true},
{"Title":"Silverlight","IsHidden":true,"AutoSelectOnWebSites":false},
{"Title":"Language Pack","IsHidden":false,"AutoSelectOnWebSites":false}]"#;

        let updates = WindowsUpdateSource::parse_updates(output).unwrap();

        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].title, "2024-05 Cumulative Update (KB5037768)");
        assert!(updates[0].is_auto_selectable);
        assert!(updates[1].is_hidden);
        assert!(!updates[2].is_hidden && !updates[2].is_auto_selectable);
    }

    #[test]
    fn test_parse_updates_single_object() {
        let output = r#"{"Title":"Defender definitions","IsHidden":false,"AutoSelectOnWebSites":true}"#;

        let updates = WindowsUpdateSource::parse_updates(output).unwrap();

        assert_eq!(updates.len(), 1);
        assert!(updates[0].is_auto_selectable);
    }

    #[test]
    fn test_parse_updates_empty() {
        assert!(WindowsUpdateSource::parse_updates("").unwrap().is_empty());
        assert!(WindowsUpdateSource::parse_updates("[]\r\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_updates_malformed() {
        let err = WindowsUpdateSource::parse_updates("Search failed: 0x8024402C").unwrap_err();
        assert!(matches!(err, InventoryError::ParseError(_)));

        let err = WindowsUpdateSource::parse_updates("42").unwrap_err();
        assert!(matches!(err, InventoryError::ParseError(_)));
    }

    #[test]
    fn test_parse_reboot_flag() {
        assert!(WindowsUpdateSource::parse_reboot_flag("True\r\n").unwrap());
        assert!(!WindowsUpdateSource::parse_reboot_flag("false").unwrap());
        assert!(WindowsUpdateSource::parse_reboot_flag("").is_err());
    }
}
