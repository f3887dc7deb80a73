use super::loader::CoverageRecord;
use super::reference;
use serde::Serialize;

/// One row of a town's coverage report, ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TownReportRow {
    pub display_code: String,
    pub town_rate: i64,
    pub national_average: i64,
    pub gap: i64,
    pub display_rank: usize,
}

/// Builds the per-town report: exact town match, fixed display ordering,
/// rates rounded half-away-from-zero, signed gap against the national
/// average. An unknown town yields an empty report.
pub fn build_report(records: &[CoverageRecord], town: &str) -> Vec<TownReportRow> {
    let mut selected: Vec<&CoverageRecord> = records
        .iter()
        .filter(|record| record.town == town)
        .collect();

    // Stable sort keeps input order for labels sharing the fallback rank.
    selected.sort_by_key(|record| reference::display_rank_of(&record.vaccine_type_raw));

    selected
        .into_iter()
        .map(|record| {
            let town_rate = record.coverage_percent.round() as i64;
            let national_average = reference::national_average_of(&record.vaccine_type_raw);
            TownReportRow {
                display_code: reference::display_code_of(&record.vaccine_type_raw).to_string(),
                town_rate,
                national_average,
                gap: town_rate - national_average,
                display_rank: reference::display_rank_of(&record.vaccine_type_raw),
            }
        })
        .collect()
}

/// Index of the preferred town within the selectable list, falling back to
/// the first entry when absent.
pub fn default_town_index(all_towns: &[String], preferred: &str) -> usize {
    all_towns
        .iter()
        .position(|town| town == preferred)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(town: &str, label: &str, coverage: f64) -> CoverageRecord {
        CoverageRecord {
            town: town.to_string(),
            vaccine_type_raw: label.to_string(),
            coverage_percent: coverage,
        }
    }

    #[test]
    fn rates_round_half_away_from_zero() {
        let records = vec![
            record("חיפה", "דלקת כבד A-HAV", 50.8),
            record("חיפה", "דלקת כבד B-HBV", 91.2),
            record("חיפה", "שיתוק ילדים (OPV)-OPV", 62.3),
            record("חיפה", "פנוימוקוק-PCV", 86.5),
        ];

        let report = build_report(&records, "חיפה");
        let rate_of = |code: &str| {
            report
                .iter()
                .find(|row| row.display_code == code)
                .map(|row| row.town_rate)
                .expect("row present")
        };

        assert_eq!(rate_of("HEP-A"), 51);
        assert_eq!(rate_of("HEP-B"), 91);
        assert_eq!(rate_of("OPV"), 62);
        assert_eq!(rate_of("PCV"), 87);
    }

    #[test]
    fn gap_preserves_sign() {
        let records = vec![record("חיפה", "דלקת כבד B-HBV", 85.0)];
        let report = build_report(&records, "חיפה");

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].national_average, 91);
        assert_eq!(report[0].gap, -6);
    }

    #[test]
    fn town_filter_is_exact_and_case_sensitive() {
        let records = vec![
            record("Haifa", "פנוימוקוק-PCV", 90.0),
            record("haifa", "פנוימוקוק-PCV", 10.0),
        ];

        let report = build_report(&records, "Haifa");
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].town_rate, 90);
    }

    #[test]
    fn unknown_town_yields_empty_report() {
        let records = vec![record("חיפה", "פנוימוקוק-PCV", 90.0)];
        assert!(build_report(&records, "NoSuchTown").is_empty());
    }

    #[test]
    fn unlisted_labels_sort_after_listed_ones_in_input_order() {
        let records = vec![
            record("חיפה", "UnknownVaxB", 40.0),
            record("חיפה", "שיתוק ילדים (OPV)-OPV", 62.3),
            record("חיפה", "UnknownVaxA", 30.0),
        ];

        let report = build_report(&records, "חיפה");
        let codes: Vec<&str> = report.iter().map(|row| row.display_code.as_str()).collect();
        assert_eq!(codes, vec!["OPV", "UnknownVaxB", "UnknownVaxA"]);
        assert_eq!(report[1].national_average, 0);
        assert_eq!(report[1].gap, 40);
    }

    #[test]
    fn default_index_falls_back_to_zero() {
        let towns: Vec<String> = ["A", "B", "C"].iter().map(|t| t.to_string()).collect();
        assert_eq!(default_town_index(&towns, "B"), 1);
        assert_eq!(default_town_index(&towns, "Z"), 0);
        assert_eq!(default_town_index(&[], "Z"), 0);
    }

    #[test]
    fn out_of_range_rates_pass_through_unclamped() {
        let records = vec![record("חיפה", "פנוימוקוק-PCV", 104.9)];
        let report = build_report(&records, "חיפה");
        assert_eq!(report[0].town_rate, 105);
        assert_eq!(report[0].gap, 18);
    }
}
