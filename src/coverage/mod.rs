mod loader;
pub mod reference;
mod report;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

pub use loader::CoverageRecord;
pub use report::{build_report, default_town_index, TownReportRow};

#[derive(Debug)]
pub enum CoverageDataError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CoverageDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageDataError::Io(err) => write!(f, "failed to read coverage export: {}", err),
            CoverageDataError::Csv(err) => write!(f, "invalid coverage CSV data: {}", err),
        }
    }
}

impl std::error::Error for CoverageDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoverageDataError::Io(err) => Some(err),
            CoverageDataError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CoverageDataError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CoverageDataError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// The coverage export parsed once and held immutably for the process
/// lifetime. The server builds one instance before accepting requests and
/// shares it behind an `Arc`; reports are pure reads against it.
#[derive(Debug)]
pub struct CoverageDataset {
    records: Vec<CoverageRecord>,
    towns: Vec<String>,
}

impl CoverageDataset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CoverageDataError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CoverageDataError> {
        let records = loader::parse_records(reader)?;
        let towns: Vec<String> = records
            .iter()
            .map(|record| record.town.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Self { records, towns })
    }

    pub fn records(&self) -> &[CoverageRecord] {
        &self.records
    }

    /// Selectable towns, sorted and de-duplicated.
    pub fn towns(&self) -> &[String] {
        &self.towns
    }

    pub fn town_report(&self, town: &str) -> Vec<TownReportRow> {
        report::build_report(&self.records, town)
    }

    pub fn default_town_index(&self, preferred: &str) -> usize {
        report::default_town_index(&self.towns, preferred)
    }
}
