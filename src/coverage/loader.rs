use serde::Deserialize;
use std::io::Read;
use tracing::debug;

/// One surviving row of the coverage export.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRecord {
    pub town: String,
    pub vaccine_type_raw: String,
    pub coverage_percent: f64,
}

#[derive(Debug, Deserialize)]
struct CoverageRow {
    #[serde(rename = "Town")]
    town: String,
    #[serde(rename = "Vaccine type")]
    vaccine_type: String,
    #[serde(rename = "Vaccine coverage")]
    coverage: String,
}

/// Parses the coverage export, dropping rows whose coverage value fails
/// numeric coercion. Row order is preserved. A leading UTF-8 BOM is stripped
/// by the csv reader.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<CoverageRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<CoverageRow>() {
        let row = record?;
        match parse_coverage_value(&row.coverage) {
            Some(coverage_percent) => records.push(CoverageRecord {
                town: row.town,
                vaccine_type_raw: row.vaccine_type,
                coverage_percent,
            }),
            None => debug!(
                town = %row.town,
                vaccine = %row.vaccine_type,
                value = %row.coverage,
                "dropping row with non-numeric coverage value"
            ),
        }
    }

    Ok(records)
}

/// Coverage values arrive as free text: possibly percent-suffixed, possibly
/// with a decimal comma, possibly padded with whitespace.
fn parse_coverage_value(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('%', "").replace(',', ".");
    cleaned.trim().parse::<f64>().ok()
}

#[cfg(test)]
pub(crate) fn parse_coverage_value_for_tests(raw: &str) -> Option<f64> {
    parse_coverage_value(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn coverage_values_are_normalized_before_parsing() {
        assert_eq!(parse_coverage_value("91,2%"), Some(91.2));
        assert_eq!(parse_coverage_value(" 50.8 "), Some(50.8));
        assert_eq!(parse_coverage_value("87"), Some(87.0));
        assert_eq!(parse_coverage_value("abc"), None);
        assert_eq!(parse_coverage_value(""), None);
        assert_eq!(parse_coverage_value("%"), None);
    }

    #[test]
    fn invalid_rows_are_dropped_and_order_preserved() {
        let csv = "Town,Vaccine type,Vaccine coverage\n\
חיפה,פנוימוקוק-PCV,88.1\n\
חיפה,נגיף רוטה-Rota,n/a\n\
חיפה,אבעבועות רוח-VAR,76%\n";
        let records = parse_records(Cursor::new(csv)).expect("parse succeeds");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vaccine_type_raw, "פנוימוקוק-PCV");
        assert_eq!(records[0].coverage_percent, 88.1);
        assert_eq!(records[1].vaccine_type_raw, "אבעבועות רוח-VAR");
        assert_eq!(records[1].coverage_percent, 76.0);
    }

    #[test]
    fn surviving_records_keep_town_and_label_text() {
        let csv = "Town,Vaccine type,Vaccine coverage\nתל אביב - יפו,UnknownVax,\"55,5\"\n";
        let records = parse_records(Cursor::new(csv)).expect("parse succeeds");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].town, "תל אביב - יפו");
        assert_eq!(records[0].vaccine_type_raw, "UnknownVax");
        assert_eq!(records[0].coverage_percent, 55.5);
    }
}
