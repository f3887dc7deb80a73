//! Fixed reference data for the national vaccination program.
//!
//! The raw labels are the Hebrew vaccine-type strings exactly as they appear
//! in the Ministry of Health export; they key all three tables and are never
//! normalized before lookup.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Raw label -> short Latin display code.
const DISPLAY_CODES: &[(&str, &str)] = &[
    ("אבעבועות רוח-VAR", "VAR"),
    ("דלקת כבד A-HAV", "HEP-A"),
    ("דלקת כבד B-HBV", "HEP-B"),
    ("ה. אינפלואנזה b-Hib", "Hib"),
    ("חצבת-חזרת-אדמת-MMR", "MMR"),
    ("נגיף רוטה-Rota", "Rota"),
    ("פלצת\u{2013}אסכרה-שעלת-Tdap", "DTaP"),
    ("פנוימוקוק-PCV", "PCV"),
    ("שיתוק ילדים (IPV)-IPV", "IPV"),
    ("שיתוק ילדים (OPV)-OPV", "OPV"),
];

/// Raw label -> national average coverage, pre-rounded half-away-from-zero
/// (79, 50.8, 91.2, 91.9, 80.4, 87, 91.9, 87, 92, 62.3 in source order).
const NATIONAL_AVERAGES: &[(&str, i64)] = &[
    ("אבעבועות רוח-VAR", 79),
    ("דלקת כבד A-HAV", 51),
    ("דלקת כבד B-HBV", 91),
    ("ה. אינפלואנזה b-Hib", 92),
    ("חצבת-חזרת-אדמת-MMR", 80),
    ("נגיף רוטה-Rota", 87),
    ("פלצת\u{2013}אסכרה-שעלת-Tdap", 92),
    ("פנוימוקוק-PCV", 87),
    ("שיתוק ילדים (IPV)-IPV", 92),
    ("שיתוק ילדים (OPV)-OPV", 62),
];

/// Display ordering for report rows, MMR group first, OPV last.
const DISPLAY_ORDER: &[&str] = &[
    "חצבת-חזרת-אדמת-MMR",
    "פלצת\u{2013}אסכרה-שעלת-Tdap",
    "דלקת כבד B-HBV",
    "פנוימוקוק-PCV",
    "אבעבועות רוח-VAR",
    "ה. אינפלואנזה b-Hib",
    "דלקת כבד A-HAV",
    "נגיף רוטה-Rota",
    "שיתוק ילדים (IPV)-IPV",
    "שיתוק ילדים (OPV)-OPV",
];

static DISPLAY_CODE_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
static NATIONAL_AVERAGE_MAP: OnceLock<HashMap<&'static str, i64>> = OnceLock::new();
static DISPLAY_RANK_MAP: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();

/// Short display code for a raw vaccine-type label. Unknown labels display
/// as themselves.
pub fn display_code_of(raw_label: &str) -> &str {
    let map = DISPLAY_CODE_MAP.get_or_init(|| DISPLAY_CODES.iter().copied().collect());
    map.get(raw_label).copied().unwrap_or(raw_label)
}

/// National average coverage for a raw vaccine-type label. Unknown labels
/// report an average of 0.
pub fn national_average_of(raw_label: &str) -> i64 {
    let map = NATIONAL_AVERAGE_MAP.get_or_init(|| NATIONAL_AVERAGES.iter().copied().collect());
    map.get(raw_label).copied().unwrap_or(0)
}

/// Position of a raw vaccine-type label in the fixed display order. Unknown
/// labels rank after every listed entry.
pub fn display_rank_of(raw_label: &str) -> usize {
    let map = DISPLAY_RANK_MAP.get_or_init(|| {
        DISPLAY_ORDER
            .iter()
            .enumerate()
            .map(|(rank, label)| (*label, rank))
            .collect()
    });
    map.get(raw_label).copied().unwrap_or(DISPLAY_ORDER.len())
}

/// Number of vaccine types in the fixed program list.
pub fn listed_label_count() -> usize {
    DISPLAY_ORDER.len()
}

/// The fixed display ordering over raw labels.
pub fn ordered_labels() -> &'static [&'static str] {
    DISPLAY_ORDER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tables_cover_the_same_ten_labels() {
        assert_eq!(DISPLAY_CODES.len(), 10);
        assert_eq!(NATIONAL_AVERAGES.len(), 10);
        assert_eq!(DISPLAY_ORDER.len(), 10);

        for (label, _) in DISPLAY_CODES {
            assert!(
                DISPLAY_ORDER.contains(label),
                "label {label} missing from display order"
            );
            assert!(
                NATIONAL_AVERAGES.iter().any(|(avg_label, _)| avg_label == label),
                "label {label} missing from averages"
            );
        }
    }

    #[test]
    fn known_labels_resolve_codes_and_averages() {
        assert_eq!(display_code_of("חצבת-חזרת-אדמת-MMR"), "MMR");
        assert_eq!(display_code_of("פלצת\u{2013}אסכרה-שעלת-Tdap"), "DTaP");
        assert_eq!(national_average_of("דלקת כבד A-HAV"), 51);
        assert_eq!(national_average_of("דלקת כבד B-HBV"), 91);
        assert_eq!(national_average_of("שיתוק ילדים (OPV)-OPV"), 62);
    }

    #[test]
    fn unknown_labels_fall_back_to_defaults() {
        assert_eq!(display_code_of("UnknownVax"), "UnknownVax");
        assert_eq!(national_average_of("UnknownVax"), 0);
        assert_eq!(display_rank_of("UnknownVax"), listed_label_count());
    }

    #[test]
    fn display_ranks_follow_the_fixed_order() {
        assert_eq!(display_rank_of("חצבת-חזרת-אדמת-MMR"), 0);
        assert_eq!(display_rank_of("פלצת\u{2013}אסכרה-שעלת-Tdap"), 1);
        assert_eq!(display_rank_of("שיתוק ילדים (OPV)-OPV"), 9);
    }
}
