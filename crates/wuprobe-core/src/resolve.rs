//! Status resolution
//!
//! A decision table evaluated top to bottom; the first matching row wins.
//!
//! | row | condition                          | status              |
//! |-----|------------------------------------|---------------------|
//! | 1   | reboot pending                     | `reboot_severity`   |
//! | 2   | nothing pending                    | OK                  |
//! | 3   | critical > 0                       | CRITICAL            |
//! | 4   | optional > 0                       | `optional_severity` |
//! | 5   | hidden only                        | OK                  |
//! | 6   | anything else (internal error)     | UNKNOWN             |

use tracing::{debug, error};
use wuprobe_api::StatusCode;

use crate::classify::Classification;
use crate::config::ProbeConfig;

pub const REBOOT_MESSAGE: &str = "updates installed, reboot required";
pub const NO_UPDATES_MESSAGE: &str = "OK - no pending updates.";
pub const INCONSISTENT_MESSAGE: &str = "UNKNOWN script state";

/// Row of the decision table that produced a [`Resolution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    RebootPending,
    NoUpdates,
    Critical,
    Optional,
    HiddenOnly,
    Inconsistent,
}

/// Resolved status with its unformatted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub status: StatusCode,
    pub message: String,
    pub rule: Rule,
}

impl Resolution {
    fn new(rule: Rule, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            rule,
        }
    }
}

/// Map the reboot flag and classification to a status and message.
///
/// A pending reboot short-circuits: `classification` is not looked at and
/// the caller need not have one. Without a reboot pending, a missing
/// classification is an internal inconsistency and resolves to UNKNOWN.
#[must_use]
pub fn resolve(
    config: &ProbeConfig,
    pending_reboot: bool,
    classification: Option<&Classification>,
) -> Resolution {
    let resolution = if pending_reboot {
        Resolution::new(Rule::RebootPending, config.reboot_severity, REBOOT_MESSAGE)
    } else {
        match classification {
            Some(c) => resolve_inventory(config, c),
            None => Resolution::new(Rule::Inconsistent, StatusCode::Unknown, INCONSISTENT_MESSAGE),
        }
    };

    if resolution.rule == Rule::Inconsistent {
        error!(?classification, pending_reboot, "status resolution reached fallback row");
    } else {
        debug!(rule = ?resolution.rule, status = %resolution.status, "status resolved");
    }

    resolution
}

fn resolve_inventory(config: &ProbeConfig, c: &Classification) -> Resolution {
    match (c.critical, c.optional, c.hidden) {
        (0, 0, 0) => Resolution::new(Rule::NoUpdates, StatusCode::Ok, NO_UPDATES_MESSAGE),
        (critical, _, _) if critical > 0 => {
            Resolution::new(Rule::Critical, StatusCode::Critical, updates_message(c))
        }
        (0, optional, _) if optional > 0 => {
            Resolution::new(Rule::Optional, config.optional_severity, updates_message(c))
        }
        (0, 0, hidden) if hidden > 0 => Resolution::new(
            Rule::HiddenOnly,
            StatusCode::Ok,
            format!("OK - {hidden} hidden updates."),
        ),
        _ => Resolution::new(Rule::Inconsistent, StatusCode::Unknown, INCONSISTENT_MESSAGE),
    }
}

/// `Updates: C critical, O optional - [T1] [T2] `
fn updates_message(c: &Classification) -> String {
    let mut message = format!(
        "Updates: {} critical, {} optional - ",
        c.critical, c.optional
    );
    for title in &c.critical_titles {
        message.push_str(title);
        message.push(' ');
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(critical: u32, optional: u32, hidden: u32) -> Classification {
        Classification {
            critical,
            optional,
            hidden,
            critical_titles: (0..critical).map(|i| format!("[KB{i}]")).collect(),
        }
    }

    #[test]
    fn test_no_updates() {
        let r = resolve(&ProbeConfig::default(), false, Some(&counts(0, 0, 0)));
        assert_eq!(r.status, StatusCode::Ok);
        assert_eq!(r.message, "OK - no pending updates.");
        assert_eq!(r.rule, Rule::NoUpdates);
    }

    #[test]
    fn test_hidden_only() {
        let r = resolve(&ProbeConfig::default(), false, Some(&counts(0, 0, 3)));
        assert_eq!(r.status, StatusCode::Ok);
        assert_eq!(r.message, "OK - 3 hidden updates.");
    }

    #[test]
    fn test_critical_message() {
        let c = Classification {
            critical: 2,
            optional: 1,
            hidden: 0,
            critical_titles: vec!["[Update1]".into(), "[Update2]".into()],
        };
        let r = resolve(&ProbeConfig::default(), false, Some(&c));
        assert_eq!(r.status, StatusCode::Critical);
        assert_eq!(r.message, "Updates: 2 critical, 1 optional - [Update1] [Update2] ");
    }

    #[test]
    fn test_critical_regardless_of_other_counts() {
        for optional in [0, 1, 50] {
            for hidden in [0, 4] {
                let r = resolve(&ProbeConfig::default(), false, Some(&counts(1, optional, hidden)));
                assert_eq!(r.status, StatusCode::Critical);
            }
        }
    }

    #[test]
    fn test_optional_uses_configured_severity() {
        let r = resolve(&ProbeConfig::default(), false, Some(&counts(0, 2, 1)));
        assert_eq!(r.status, StatusCode::Warning);
        assert_eq!(r.message, "Updates: 0 critical, 2 optional - ");

        let config = ProbeConfig::default().with_optional_severity(StatusCode::Ok);
        let r = resolve(&config, false, Some(&counts(0, 2, 1)));
        assert_eq!(r.status, StatusCode::Ok);
    }

    #[test]
    fn test_reboot_short_circuits() {
        let r = resolve(&ProbeConfig::default(), true, Some(&counts(5, 2, 1)));
        assert_eq!(r.status, StatusCode::Warning);
        assert_eq!(r.message, "updates installed, reboot required");
        assert_eq!(r.rule, Rule::RebootPending);

        let r = resolve(&ProbeConfig::default(), true, None);
        assert_eq!(r.message, "updates installed, reboot required");
    }

    #[test]
    fn test_reboot_uses_configured_severity() {
        let config = ProbeConfig::default().with_reboot_severity(StatusCode::Critical);
        let r = resolve(&config, true, None);
        assert_eq!(r.status, StatusCode::Critical);
    }

    #[test]
    fn test_missing_classification_is_inconsistent() {
        let r = resolve(&ProbeConfig::default(), false, None);
        assert_eq!(r.status, StatusCode::Unknown);
        assert_eq!(r.message, "UNKNOWN script state");
        assert_eq!(r.rule, Rule::Inconsistent);
    }
}
