//! Label column resolution for the Taiwan export.
//!
//! The same public dataset circulates on several mirrors with different
//! punctuation, spacing and pluralization in its label header. Exact matches
//! against known variants are tried first; a substring match is the fallback.

use crate::error::SchemaError;

/// Known label header variants, highest priority first (already normalized).
/// Spaced or trailing-space spellings such as `"default payment next month "`
/// normalize onto the first entry.
pub const LABEL_CANDIDATES: [&str; 7] = [
    "default.payment.next.month",
    "default.payment.next.month.",
    "default.payment.next.months",
    "default.payment.nextmonth",
    "default.payment.next",
    "default.payment",
    "default",
];

const LABEL_SUBSTRING: &str = "default";

/// Lowercase, strip a BOM, collapse whitespace runs and join words with `.`.
pub fn normalize_label_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
}

/// Find the original name of the binary default-outcome column.
///
/// Columns are keyed by normalized name. Keys keep the position of their
/// first appearance, but when two columns normalize to the same key the
/// later column is the one returned.
pub fn resolve_label_column(column_names: &[String]) -> Result<String, SchemaError> {
    let mut keyed: Vec<(String, &String)> = Vec::with_capacity(column_names.len());
    for name in column_names {
        let key = normalize_label_name(name);
        match keyed.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = name,
            None => keyed.push((key, name)),
        }
    }

    for candidate in LABEL_CANDIDATES {
        if let Some((_, original)) = keyed.iter().find(|(k, _)| k == candidate) {
            return Ok((*original).clone());
        }
    }

    keyed
        .iter()
        .find(|(key, _)| key.contains(LABEL_SUBSTRING))
        .map(|(_, original)| (*original).clone())
        .ok_or_else(|| SchemaError::LabelNotFound {
            available: column_names.to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_label_name("  Default   Payment next month "), "default.payment.next.month");
        assert_eq!(normalize_label_name("\u{feff}DEFAULT"), "default");
    }

    #[test]
    fn spaced_and_dotted_variants_resolve() {
        let spaced = resolve_label_column(&names(&["ID", "AGE", "default payment next month"])).unwrap();
        let dotted = resolve_label_column(&names(&["ID", "AGE", "default.payment.next.month"])).unwrap();
        assert_eq!(spaced, "default payment next month");
        assert_eq!(dotted, "default.payment.next.month");
        assert_eq!(normalize_label_name(&spaced), normalize_label_name(&dotted));
    }

    #[test]
    fn exact_candidates_beat_substring_matches() {
        let cols = names(&["is_default_flag", "AGE", "default.payment.next.month."]);
        assert_eq!(resolve_label_column(&cols).unwrap(), "default.payment.next.month.");
    }

    #[test]
    fn priority_order_is_respected() {
        let cols = names(&["default", "default.payment.next.month"]);
        assert_eq!(resolve_label_column(&cols).unwrap(), "default.payment.next.month");
    }

    #[test]
    fn substring_fallback_uses_column_order() {
        let cols = names(&["AGE", "will_default_12m", "prior_default"]);
        assert_eq!(resolve_label_column(&cols).unwrap(), "will_default_12m");
    }

    #[test]
    fn underscore_variant_loses_to_plain_default() {
        let cols = names(&["default_payment_next_month", "default"]);
        assert_eq!(resolve_label_column(&cols).unwrap(), "default");
        let only = names(&["AGE", "default_payment_next_month"]);
        assert_eq!(resolve_label_column(&only).unwrap(), "default_payment_next_month");
    }

    #[test]
    fn later_column_wins_on_normalized_collision() {
        let cols = names(&["default payment next month", "AGE", "Default.Payment.Next.Month"]);
        assert_eq!(resolve_label_column(&cols).unwrap(), "Default.Payment.Next.Month");

        let fallback = names(&["is_default", "AGE", "IS_DEFAULT", "prior_default"]);
        assert_eq!(resolve_label_column(&fallback).unwrap(), "IS_DEFAULT");
    }

    #[test]
    fn missing_label_reports_all_columns() {
        let cols = names(&["ID", "AGE", "LIMIT_BAL"]);
        let err = resolve_label_column(&cols).unwrap_err();
        assert_eq!(err, SchemaError::LabelNotFound { available: cols });
    }
}
