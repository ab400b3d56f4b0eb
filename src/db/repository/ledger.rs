//! Ledger repository trait: partitioned reads and writes for the three
//! record categories, plus import bookkeeping.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{FuelRecord, OperationRecord, PartitionMonth, RepairRecord};

/// Storage operations over the vehicle ledgers.
///
/// Reads are scoped to a vehicle and a single partition month; callers that
/// need a wider window fan out over months themselves. Implementations must
/// keep the miss/failure distinction intact: a partition that does not exist
/// is `NotFound`, an unreachable backend is `ConnectionError` or
/// `TimeoutError`, and an existing partition with no matching records is an
/// empty `Ok` result.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Checks whether the backend is reachable and healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetches a vehicle's operation records from one monthly partition.
    ///
    /// Returns every record in `operations/{partition}/records` whose
    /// `vehicleNumber` matches, regardless of the dates on the records
    /// themselves. Date filtering is the caller's job.
    async fn query_operation_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<OperationRecord>>;

    /// Fetches a vehicle's fuel records for one month.
    ///
    /// Fuel records live in a flat collection; the partition supplies the
    /// `year`/`month` equality predicates.
    async fn query_fuel_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<FuelRecord>>;

    /// Fetches a vehicle's repair records for one month.
    async fn query_repair_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<RepairRecord>>;

    /// Stores imported operation records into the given partition.
    ///
    /// The partition is the month the import runs in, not necessarily the
    /// month on the records. Returns the number of records stored.
    async fn insert_operation_records(
        &self,
        partition: PartitionMonth,
        records: &[OperationRecord],
    ) -> RepositoryResult<usize>;

    /// Stores a single fuel record.
    async fn insert_fuel_record(&self, record: &FuelRecord) -> RepositoryResult<()>;

    /// Stores a single repair record.
    async fn insert_repair_record(&self, record: &RepairRecord) -> RepositoryResult<()>;

    /// Whether a transport log with this checksum was already imported.
    async fn has_import(&self, checksum: &str) -> RepositoryResult<bool>;

    /// Marks a transport log checksum as imported.
    async fn record_import(&self, checksum: &str, record_count: usize) -> RepositoryResult<()>;
}
