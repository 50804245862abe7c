//! Message formatting for the monitoring transport

use wuprobe_api::ProbeResult;

use crate::classify::Classification;
use crate::resolve::Resolution;

/// Hard size limit of one passive check result
pub const TRANSPORT_LIMIT: usize = 1024;
/// Space kept free for the performance data suffix
pub const PERFDATA_RESERVE: usize = 48;
/// Longest message text that is sent
pub const MESSAGE_LIMIT: usize = 975;

/// ASCII replacement for characters update titles commonly carry
fn ascii_for(c: char) -> Option<&'static str> {
    let replacement = match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "Ae",
        'œ' => "oe",
        'Œ' => "Oe",
        'á' | 'à' | 'â' | 'ã' | 'å' => "a",
        'Á' | 'À' | 'Â' | 'Ã' | 'Å' => "A",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'É' | 'È' | 'Ê' | 'Ë' => "E",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'Í' | 'Ì' | 'Î' | 'Ï' => "I",
        'ó' | 'ò' | 'ô' | 'õ' | 'ø' => "o",
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ø' => "O",
        'ú' | 'ù' | 'û' => "u",
        'Ú' | 'Ù' | 'Û' => "U",
        'ç' => "c",
        'Ç' => "C",
        'ñ' => "n",
        'Ñ' => "N",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        '–' | '—' => "-",
        '‘' | '’' => "'",
        '“' | '”' | '„' => "\"",
        '\u{a0}' => " ",
        _ => return None,
    };
    Some(replacement)
}

/// Replace known accented and typographic characters with ASCII.
/// Anything not in the table is kept as is.
#[must_use]
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match ascii_for(c) {
            Some(ascii) => out.push_str(ascii),
            None => out.push(c),
        }
    }
    out
}

/// Keep at most `limit` characters; no ellipsis, no word boundaries.
#[must_use]
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Build the final result from a resolution.
///
/// Messages listing pending updates are transliterated and bounded to
/// [`MESSAGE_LIMIT`]; the fixed OK, hidden-only and reboot messages are
/// passed through. Performance data is attached whenever the inventory was
/// classified, so never on the reboot branch.
#[must_use]
pub fn format(resolution: Resolution, classification: Option<&Classification>) -> ProbeResult {
    let message = match classification {
        Some(c) if c.has_visible() => truncate(&transliterate(&resolution.message), MESSAGE_LIMIT),
        _ => resolution.message,
    };

    let result = ProbeResult::new(resolution.status, message);
    match classification {
        Some(c) => result.with_perfdata(c.perfdata()),
        None => result,
    }
}

#[cfg(test)]
mod tests {
    use wuprobe_api::StatusCode;

    use super::*;
    use crate::config::ProbeConfig;
    use crate::resolve::resolve;

    #[test]
    fn test_limits_fit_transport() {
        assert!(MESSAGE_LIMIT + PERFDATA_RESERVE <= TRANSPORT_LIMIT);
    }

    #[test]
    fn test_transliterate_umlaut() {
        assert_eq!(transliterate("ü"), "ue");
        assert_eq!(
            transliterate("Sicherheitsupdate für Microsoft Office – Größe"),
            "Sicherheitsupdate fuer Microsoft Office - Groesse"
        );
    }

    #[test]
    fn test_transliterate_passes_unmapped() {
        assert_eq!(transliterate("KB5037768 (x64) 日本"), "KB5037768 (x64) 日本");
    }

    #[test]
    fn test_truncate_ascii() {
        let text = "a".repeat(2000);
        let out = truncate(&text, MESSAGE_LIMIT);
        assert_eq!(out.len(), 975);
        assert!(text.starts_with(&out));
    }

    #[test]
    fn test_truncate_short_is_unchanged() {
        assert_eq!(truncate("short", MESSAGE_LIMIT), "short");
        assert_eq!(truncate(&"b".repeat(975), MESSAGE_LIMIT).len(), 975);
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "日".repeat(1000);
        let out = truncate(&text, MESSAGE_LIMIT);
        assert_eq!(out.chars().count(), 975);
    }

    #[test]
    fn test_format_long_critical_list() {
        let c = Classification {
            critical: 60,
            optional: 0,
            hidden: 0,
            critical_titles: (0..60)
                .map(|i| format!("[Kumulatives Update für Windows 11 (KB50{i:04})]"))
                .collect(),
        };
        let resolution = resolve(&ProbeConfig::default(), false, Some(&c));

        let result = format(resolution, Some(&c));

        assert_eq!(result.status, StatusCode::Critical);
        assert_eq!(result.message.chars().count(), MESSAGE_LIMIT);
        assert!(result.message.starts_with("Updates: 60 critical, 0 optional - [Kumulatives Update fuer"));
        assert!(result.message.is_ascii());
        assert_eq!(result.perfdata.unwrap().critical, 60);
    }

    #[test]
    fn test_format_no_updates_verbatim() {
        let c = Classification::default();
        let resolution = resolve(&ProbeConfig::default(), false, Some(&c));

        let result = format(resolution, Some(&c));

        assert_eq!(result.message, "OK - no pending updates.");
        assert_eq!(
            result.perfdata.map(|p| p.to_string()).as_deref(),
            Some("critical=0;optional=0;hidden=0")
        );
    }

    #[test]
    fn test_format_reboot_has_no_perfdata() {
        let resolution = resolve(&ProbeConfig::default(), true, None);

        let result = format(resolution, None);

        assert_eq!(result.status, StatusCode::Warning);
        assert_eq!(result.message, "updates installed, reboot required");
        assert!(result.perfdata.is_none());
    }
}
