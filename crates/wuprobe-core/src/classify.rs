//! Update classification

use wuprobe_api::{PerfData, UpdateRecord};

/// Pending updates bucketed by severity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub critical: u32,
    pub optional: u32,
    pub hidden: u32,
    /// Titles of critical updates, bracketed, in encounter order
    pub critical_titles: Vec<String>,
}

impl Classification {
    /// Number of records examined
    #[must_use]
    pub fn total(&self) -> u32 {
        self.critical + self.optional + self.hidden
    }

    /// Whether any visible (non-hidden) update is pending
    #[must_use]
    pub fn has_visible(&self) -> bool {
        self.critical + self.optional > 0
    }

    #[must_use]
    pub fn perfdata(&self) -> PerfData {
        PerfData {
            critical: self.critical,
            optional: self.optional,
            hidden: self.hidden,
        }
    }
}

/// Bucket each update: hidden first, then auto-selectable as critical,
/// everything else optional.
#[must_use]
pub fn classify(updates: &[UpdateRecord]) -> Classification {
    updates
        .iter()
        .fold(Classification::default(), |mut acc, update| {
            if update.is_hidden {
                acc.hidden += 1;
            } else if update.is_auto_selectable {
                acc.critical += 1;
                acc.critical_titles.push(format!("[{}]", update.title));
            } else {
                acc.optional += 1;
            }
            acc
        })
}
