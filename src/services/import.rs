//! Transport-log import: CSV parsing, deduplication and storage.
//!
//! The back office receives one transport log per accounting batch as CSV
//! text with the columns
//! `vehicle_number,date,unit_amount,chargeable_weight,deducted_amount`.
//! Rows that fail to parse are collected and reported, never silently
//! dropped, and a whole log is refused only when its header is unusable.
//!
//! Imported records are stored into the partition of the month the import
//! runs in. A record whose date falls in the previous month therefore ends
//! up in a partition one month past its logical date, which is exactly the
//! carry-over the statistics reader probes for.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::checksum::calculate_checksum;
use crate::db::repository::error::RepositoryError;
use crate::db::repository::ledger::LedgerRepository;
use crate::models::{CalendarDate, OperationRecord, PartitionMonth};

const REQUIRED_COLUMNS: [&str; 5] = [
    "vehicle_number",
    "date",
    "unit_amount",
    "chargeable_weight",
    "deducted_amount",
];

/// Errors that abort an import entirely.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("transport log is empty")]
    EmptyLog,

    #[error("transport log is missing required column '{0}'")]
    MissingColumn(String),

    #[error("failed to read transport log: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based line number in the submitted file (header is line 1).
    pub row: usize,
    pub reason: String,
}

/// Outcome of a parse pass over a transport log.
#[derive(Debug, Clone)]
pub struct ParsedLog {
    pub records: Vec<OperationRecord>,
    pub skipped: Vec<RowError>,
}

/// Outcome of a full import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub checksum: String,
    /// Records stored by this run. Zero when the log was a duplicate.
    pub imported: usize,
    pub skipped: Vec<RowError>,
    /// True when this exact log content had been imported before.
    pub duplicate: bool,
}

/// Parses transport-log CSV text into operation records.
///
/// Header validation failures abort; individual row failures are collected
/// into `skipped` with their line numbers.
pub fn parse_transport_log(content: &str) -> Result<ParsedLog, ImportError> {
    if content.trim().is_empty() {
        return Err(ImportError::EmptyLog);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // Header is line 1, so the first data row is line 2.
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                skipped.push(RowError {
                    row: line,
                    reason: format!("unreadable row: {}", err),
                });
                continue;
            }
        };
        match parse_row(&row, &columns) {
            Ok(record) => records.push(record),
            Err(reason) => skipped.push(RowError { row: line, reason }),
        }
    }

    Ok(ParsedLog { records, skipped })
}

/// Imports a transport log into the given entry-month partition.
///
/// The log's checksum is checked first; an already-imported log is reported
/// as a duplicate and nothing is written. The checksum is only recorded
/// once at least one record has been stored.
pub async fn import_transport_log<R>(
    repository: &R,
    content: &str,
    entry_month: PartitionMonth,
) -> Result<ImportSummary, ImportError>
where
    R: LedgerRepository + ?Sized,
{
    let checksum = calculate_checksum(content);
    if repository.has_import(&checksum).await? {
        warn!("duplicate transport log (checksum {}); skipping", checksum);
        return Ok(ImportSummary {
            checksum,
            imported: 0,
            skipped: Vec::new(),
            duplicate: true,
        });
    }

    let parsed = parse_transport_log(content)?;
    if !parsed.skipped.is_empty() {
        warn!(
            "transport log has {} unusable rows out of {}",
            parsed.skipped.len(),
            parsed.skipped.len() + parsed.records.len()
        );
    }

    let mut imported = 0;
    if !parsed.records.is_empty() {
        imported = repository
            .insert_operation_records(entry_month, &parsed.records)
            .await?;
        repository.record_import(&checksum, imported).await?;
        info!(
            "imported {} operation records into partition {} (checksum {})",
            imported, entry_month, checksum
        );
    }

    Ok(ImportSummary {
        checksum,
        imported,
        skipped: parsed.skipped,
        duplicate: false,
    })
}

struct ColumnIndices {
    vehicle_number: usize,
    date: usize,
    unit_amount: usize,
    chargeable_weight: usize,
    deducted_amount: usize,
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnIndices, ImportError> {
    let position = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| ImportError::MissingColumn(name.to_string()))
    };
    for column in REQUIRED_COLUMNS {
        position(column)?;
    }
    Ok(ColumnIndices {
        vehicle_number: position("vehicle_number")?,
        date: position("date")?,
        unit_amount: position("unit_amount")?,
        chargeable_weight: position("chargeable_weight")?,
        deducted_amount: position("deducted_amount")?,
    })
}

fn parse_row(row: &csv::StringRecord, columns: &ColumnIndices) -> Result<OperationRecord, String> {
    let vehicle_number = row
        .get(columns.vehicle_number)
        .unwrap_or_default()
        .to_string();
    if vehicle_number.is_empty() {
        return Err("vehicle_number is empty".to_string());
    }

    let date = parse_date(row.get(columns.date).unwrap_or_default())?;
    let unit_amount = parse_amount(row.get(columns.unit_amount).unwrap_or_default(), "unit_amount")?;
    let chargeable_weight = parse_amount(
        row.get(columns.chargeable_weight).unwrap_or_default(),
        "chargeable_weight",
    )?;
    let deducted_amount = parse_amount(
        row.get(columns.deducted_amount).unwrap_or_default(),
        "deducted_amount",
    )?;

    Ok(OperationRecord {
        vehicle_number,
        year: date.year_field(),
        month: date.month_field(),
        day: date.day_field(),
        unit_amount,
        chargeable_weight,
        deducted_amount,
    })
}

fn parse_date(value: &str) -> Result<CalendarDate, String> {
    // Exports from the spreadsheet use ISO dates; older files use slashes.
    if let Ok(date) = CalendarDate::parse_iso(value) {
        return Ok(date);
    }
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y/%m/%d")
        .map(CalendarDate::from)
        .map_err(|_| format!("unparseable date '{}'", value))
}

fn parse_amount(value: &str, column: &str) -> Result<f64, String> {
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned
        .parse()
        .map_err(|_| format!("{} is not a number: '{}'", column, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;

    const LOG: &str = "\
vehicle_number,date,unit_amount,chargeable_weight,deducted_amount
V-100,2025-01-31,1200,4.5,300
V-100,2025/02/01,\"1,000\",2.0,0
V-200,2025-02-02,800,3.0,150
";

    #[test]
    fn parses_every_well_formed_row() {
        let parsed = parse_transport_log(LOG).unwrap();
        assert_eq!(parsed.records.len(), 3);
        assert!(parsed.skipped.is_empty());

        let first = &parsed.records[0];
        assert_eq!(first.vehicle_number, "V-100");
        assert_eq!((first.year.as_str(), first.month.as_str(), first.day.as_str()),
                   ("2025", "01", "31"));
        assert_eq!(first.unit_amount, 1200.0);

        // Slash dates and thousands separators both parse.
        let second = &parsed.records[1];
        assert_eq!(second.month, "02");
        assert_eq!(second.unit_amount, 1000.0);
    }

    #[test]
    fn bad_rows_are_collected_not_fatal() {
        let log = "\
vehicle_number,date,unit_amount,chargeable_weight,deducted_amount
V-100,2025-01-31,1200,4.5,300
,2025-01-31,1200,4.5,300
V-100,January 31st,1200,4.5,300
V-100,2025-01-31,twelve,4.5,300
";
        let parsed = parse_transport_log(log).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped.len(), 3);
        assert_eq!(parsed.skipped[0].row, 3);
        assert!(parsed.skipped[1].reason.contains("unparseable date"));
        assert!(parsed.skipped[2].reason.contains("unit_amount"));
    }

    #[test]
    fn missing_column_aborts() {
        let log = "vehicle_number,date,unit_amount\nV-100,2025-01-31,1200\n";
        let err = parse_transport_log(log).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(column) if column == "chargeable_weight"));
    }

    #[test]
    fn empty_log_aborts() {
        assert!(matches!(
            parse_transport_log("  \n "),
            Err(ImportError::EmptyLog)
        ));
    }

    #[tokio::test]
    async fn import_stores_into_the_entry_month_partition() {
        let repo = LocalRepository::new();
        let entry_month = PartitionMonth::new(2025, 2);

        let summary = import_transport_log(&repo, LOG, entry_month).await.unwrap();
        assert_eq!(summary.imported, 3);
        assert!(!summary.duplicate);

        // The January-dated record is in the February partition.
        let records = repo
            .query_operation_records("V-100", entry_month)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.month == "01"));
    }

    #[tokio::test]
    async fn second_import_of_same_content_is_a_duplicate() {
        let repo = LocalRepository::new();
        let entry_month = PartitionMonth::new(2025, 2);

        import_transport_log(&repo, LOG, entry_month).await.unwrap();
        let second = import_transport_log(&repo, LOG, entry_month).await.unwrap();
        assert!(second.duplicate);
        assert_eq!(second.imported, 0);

        // Nothing was written twice.
        let records = repo
            .query_operation_records("V-100", entry_month)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
