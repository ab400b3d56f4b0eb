//! Period statistics over a vehicle's ledgers.
//!
//! The central computation of the back office: given a vehicle and an
//! inclusive date range, fan out over the monthly partitions that could
//! hold matching records, filter each record by the logical date on its own
//! fields, and reduce the survivors into one [`PeriodStatistics`].
//!
//! Records entered late land in the partition of their *entry* month, one
//! month after their logical date at worst. The probe list therefore always
//! extends one month past the range, wrapping December into January.

use futures::future::join_all;
use log::{info, warn};
use thiserror::Error;

use crate::db::repository::error::RepositoryError;
use crate::db::repository::ledger::LedgerRepository;
use crate::db::repository::RepositoryResult;
use crate::models::{
    CalendarDate, DateError, DateRange, FuelRecord, OperationRecord, PartitionMonth,
    PeriodStatistics, RecordCategory, RepairRecord,
};

/// Management fee rate applied to the period's total amount.
pub const MANAGEMENT_FEE_RATE: f64 = 0.05;

/// Errors surfaced by statistics computation.
///
/// `InvalidInput` and `InvalidPeriod` are rejected before any query runs.
/// `Unavailable` means at least one partition of one category could not be
/// read; no partial figures are ever returned.
#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("{category} records unavailable: {source}")]
    Unavailable {
        category: RecordCategory,
        #[source]
        source: RepositoryError,
    },
}

/// Tuning knobs for statistics computation.
#[derive(Debug, Clone, Default)]
pub struct StatisticsOptions {
    /// Overrides "today" for period validation. Tests pin this; the server
    /// leaves it `None` and uses the wall clock.
    pub today: Option<CalendarDate>,
    /// When set, a partition read that fails in transit is logged and
    /// treated as empty instead of failing the whole computation. Off by
    /// default: a silent gap in the figures is worse than an error page.
    pub lenient_transport: bool,
}

/// Computes period statistics with default options.
pub async fn compute_statistics<R>(
    repository: &R,
    vehicle_number: &str,
    start: CalendarDate,
    end: CalendarDate,
) -> Result<PeriodStatistics, StatisticsError>
where
    R: LedgerRepository + ?Sized,
{
    compute_statistics_with_options(
        repository,
        vehicle_number,
        start,
        end,
        &StatisticsOptions::default(),
    )
    .await
}

/// Computes period statistics for one vehicle over an inclusive date range.
///
/// Validation happens first: an empty vehicle number is `InvalidInput`, a
/// reversed range or an end date in the future is `InvalidPeriod`, and in
/// both cases no query is issued. The three categories are then fetched
/// concurrently, each fanning out over every probe month.
///
/// A probe month whose operations partition does not exist contributes
/// nothing; that miss is logged and absorbed. Transport failures are only
/// raised after every partition of the affected category has been attempted.
pub async fn compute_statistics_with_options<R>(
    repository: &R,
    vehicle_number: &str,
    start: CalendarDate,
    end: CalendarDate,
    options: &StatisticsOptions,
) -> Result<PeriodStatistics, StatisticsError>
where
    R: LedgerRepository + ?Sized,
{
    let vehicle = vehicle_number.trim();
    if vehicle.is_empty() {
        return Err(StatisticsError::InvalidInput(
            "vehicle number must not be empty".to_string(),
        ));
    }
    if start > end {
        return Err(StatisticsError::InvalidPeriod(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    let today = options.today.unwrap_or_else(CalendarDate::today);
    if end > today {
        return Err(StatisticsError::InvalidPeriod(format!(
            "end date {} is in the future (today is {})",
            end, today
        )));
    }

    let months = enumerate_probe_months(start, end);
    let range = DateRange::new(start, end);
    let lenient = options.lenient_transport;

    info!(
        "computing statistics for vehicle {} over {} ({} probe months)",
        vehicle,
        range,
        months.len()
    );

    let operations = async {
        let queries = months.iter().map(|&month| async move {
            (month, repository.query_operation_records(vehicle, month).await)
        });
        collect_category(
            RecordCategory::Operations,
            vehicle,
            join_all(queries).await,
            lenient,
        )
    };
    let fuel = async {
        let queries = months.iter().map(|&month| async move {
            (month, repository.query_fuel_records(vehicle, month).await)
        });
        collect_category(RecordCategory::Fuel, vehicle, join_all(queries).await, lenient)
    };
    let repairs = async {
        let queries = months.iter().map(|&month| async move {
            (month, repository.query_repair_records(vehicle, month).await)
        });
        collect_category(
            RecordCategory::Repairs,
            vehicle,
            join_all(queries).await,
            lenient,
        )
    };

    let (operations, fuel, repairs) = tokio::try_join!(operations, fuel, repairs)?;

    let statistics = reduce(&range, &operations, &fuel, &repairs);
    info!(
        "vehicle {} over {}: {} records, total {:.2}",
        vehicle, range, statistics.record_count, statistics.total_amount
    );
    Ok(statistics)
}

/// Lists the partition months to probe for a date range.
///
/// Every month from `start` through `end` inclusive, plus one month past the
/// end to catch carried-over records. December wraps into January of the
/// next year. Expects `start <= end`.
pub fn enumerate_probe_months(start: CalendarDate, end: CalendarDate) -> Vec<PartitionMonth> {
    let last = PartitionMonth::of(end);
    let mut months = Vec::new();
    let mut cursor = PartitionMonth::of(start);
    while cursor < last {
        months.push(cursor);
        cursor = cursor.next();
    }
    months.push(last);

    let probe = last.next();
    if !months.contains(&probe) {
        months.push(probe);
    }
    months
}

/// Folds one category's per-partition results.
///
/// `NotFound` misses are absorbed with a warning. Transport failures fail
/// the category (first failure wins) unless lenient mode is on, in which
/// case they degrade to warnings and the partition counts as empty.
fn collect_category<T>(
    category: RecordCategory,
    vehicle: &str,
    results: Vec<(PartitionMonth, RepositoryResult<Vec<T>>)>,
    lenient: bool,
) -> Result<Vec<T>, StatisticsError> {
    let mut records = Vec::new();
    let mut failure: Option<RepositoryError> = None;

    for (month, result) in results {
        match result {
            Ok(batch) => records.extend(batch),
            Err(RepositoryError::NotFound { .. }) => {
                warn!(
                    "no {} partition {} for vehicle {}; treating as empty",
                    category, month, vehicle
                );
            }
            Err(err) if lenient => {
                warn!(
                    "{} read failed for vehicle {} in {} ({}); lenient mode treats it as empty",
                    category, vehicle, month, err
                );
            }
            Err(err) => {
                warn!(
                    "{} read failed for vehicle {} in {}: {}",
                    category, vehicle, month, err
                );
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }
    }

    match failure {
        Some(source) => Err(StatisticsError::Unavailable { category, source }),
        None => Ok(records),
    }
}

/// Reduces fetched records into period figures.
///
/// Only records whose logical date falls inside the range count. Records
/// with malformed date fields are skipped with a warning rather than
/// poisoning the whole period. The management fee is computed from the
/// unrounded total and is the only rounded figure.
fn reduce(
    range: &DateRange,
    operations: &[OperationRecord],
    fuel: &[FuelRecord],
    repairs: &[RepairRecord],
) -> PeriodStatistics {
    let mut statistics = PeriodStatistics::default();

    for record in operations {
        if !included(range, record.logical_date(), RecordCategory::Operations) {
            continue;
        }
        statistics.total_amount += record.revenue();
        statistics.deducted_amount += record.deducted_amount;
        statistics.record_count += 1;
    }
    for record in fuel {
        if !included(range, record.logical_date(), RecordCategory::Fuel) {
            continue;
        }
        statistics.total_fuel_cost += record.total_fuel_cost;
        statistics.record_count += 1;
    }
    for record in repairs {
        if !included(range, record.logical_date(), RecordCategory::Repairs) {
            continue;
        }
        statistics.total_repair_cost += record.repair_cost;
        statistics.record_count += 1;
    }

    // f64::round rounds half away from zero, matching the book-keeping rule.
    statistics.management_fee = (statistics.total_amount * MANAGEMENT_FEE_RATE).round();
    statistics
}

fn included(
    range: &DateRange,
    date: Result<CalendarDate, DateError>,
    category: RecordCategory,
) -> bool {
    match date {
        Ok(date) => range.contains(date),
        Err(err) => {
            warn!("skipping {} record with malformed date: {}", category, err);
            false
        }
    }
}
