//! ISO 8601 duration parsing and display formatting

use regex::Regex;
use std::sync::OnceLock;

const ISO_DURATION_PATTERN: &str =
    r"(?i)P(?:([0-9]+)D)?T?(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)S)?";

fn iso_regex() -> &'static Regex {
    static ISO: OnceLock<Regex> = OnceLock::new();
    ISO.get_or_init(|| Regex::new(ISO_DURATION_PATTERN).expect("duration pattern is valid"))
}

/// Parse a platform duration such as `PT1H2M30S` into seconds.
///
/// Days, hours, minutes and seconds are supported; missing components
/// count as zero and input without a `P` designator parses as 0.
pub fn parse_iso8601_duration(iso: &str) -> u64 {
    let Some(caps) = iso_regex().captures(iso) else {
        return 0;
    };

    let component = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    component(1)
        .saturating_mul(86_400)
        .saturating_add(component(2).saturating_mul(3_600))
        .saturating_add(component(3).saturating_mul(60))
        .saturating_add(component(4))
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour up
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
