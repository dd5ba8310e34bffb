//! Shared display helpers.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned, human-readable tables
    #[default]
    Text,
    /// One CSV table per report
    Csv,
    /// Pretty-printed JSON of the full report
    Json,
}

/// `£1.23B`, `£4.5M`, `£12K`, `£999`; negatives keep their sign.
pub fn format_money(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let v = value.abs();
    if v >= 1e9 {
        format!("{}£{:.2}B", sign, v / 1e9)
    } else if v >= 1e6 {
        format!("{}£{:.1}M", sign, v / 1e6)
    } else if v >= 1e3 {
        format!("{}£{:.0}K", sign, v / 1e3)
    } else {
        format!("{}£{:.0}", sign, v)
    }
}

/// `building_company_basic` → `Company Basic`.
pub fn building_display_name(tag: &str) -> String {
    let stem = tag.strip_prefix("building_").unwrap_or(tag);
    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Capitalise each word and lowercase the rest of it.
fn title_words<'a>(words: impl Iterator<Item = &'a str>) -> Vec<String> {
    words
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// `identity_trade_league` → `Trade League`; `Unknown Type` when empty.
pub fn format_identity(identity: &str) -> String {
    let stem = identity.strip_prefix("identity_").unwrap_or(identity);
    let words = title_words(stem.split('_'));
    if words.is_empty() {
        "Unknown Type".to_string()
    } else {
        words.join(" ")
    }
}

/// `principle_external_trade_3` → `External Trade (Tier 3)`.
pub fn format_principle(principle: &str) -> String {
    let stem = principle.strip_prefix("principle_").unwrap_or(principle);
    let mut parts: Vec<&str> = stem.split('_').collect();
    let numeric = |w: &&str| !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit());
    let tier = if parts.len() > 1 && parts.last().is_some_and(numeric) {
        parts.pop()
    } else {
        None
    };

    let name = title_words(parts.into_iter()).join(" ");
    match tier {
        Some(tier) => format!("{} (Tier {})", name, tier),
        None => name,
    }
}

/// `part` as a percentage of `whole`, 0 when `whole` is not positive.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Underlined heading used at the top of every text report.
pub fn banner(title: &str, width: usize) -> String {
    let rule = "=".repeat(width);
    format!("{rule}\n{title}\n{rule}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1_234_000_000.0), "£1.23B");
        assert_eq!(format_money(4_500_000.0), "£4.5M");
        assert_eq!(format_money(12_300.0), "£12K");
        assert_eq!(format_money(999.0), "£999");
        assert_eq!(format_money(0.0), "£0");
        assert_eq!(format_money(-2_000_000.0), "-£2.0M");
    }

    #[test]
    fn test_building_display_name() {
        assert_eq!(building_display_name("building_company_basic"), "Company Basic");
        assert_eq!(building_display_name("building_steel_mills"), "Steel Mills");
        assert_eq!(building_display_name("port"), "Port");
        assert_eq!(building_display_name("building__odd__tag"), "Odd Tag");
    }

    #[test]
    fn test_format_identity() {
        assert_eq!(format_identity("identity_trade_league"), "Trade League");
        assert_eq!(format_identity("identity_IDEOLOGICAL_union"), "Ideological Union");
        assert_eq!(format_identity(""), "Unknown Type");
    }

    #[test]
    fn test_format_principle() {
        assert_eq!(format_principle("principle_external_trade_3"), "External Trade (Tier 3)");
        assert_eq!(format_principle("principle_market_unification_1"), "Market Unification (Tier 1)");
        assert_eq!(format_principle("principle_vassalization"), "Vassalization");
        assert_eq!(format_principle("7"), "7");
    }

    #[test]
    fn test_percent_guards_zero() {
        assert_eq!(percent(5.0, 0.0), 0.0);
        assert_eq!(percent(25.0, 200.0), 12.5);
    }
}
