//! In-memory repository implementation.
//!
//! Backs unit and integration tests and the default local development
//! server. Mirrors the production store's observable behavior, including
//! the distinction between a missing operations partition (`NotFound`) and
//! an existing partition with no matching records (empty `Ok`).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::debug;

use crate::api::DriverId;
use crate::db::repository::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::db::repository::{DriverRepository, LedgerRepository};
use crate::models::{Driver, FuelRecord, OperationRecord, PartitionMonth, RecordCategory, RepairRecord};

#[derive(Debug, Default)]
struct LocalData {
    /// Operation records keyed by partition ("2025-02").
    operations: HashMap<String, Vec<OperationRecord>>,
    /// Flat fuel collection; records are queried by their own fields.
    fuel: Vec<FuelRecord>,
    /// Flat repair collection.
    repairs: Vec<RepairRecord>,
    drivers: HashMap<DriverId, Driver>,
    /// Imported transport-log checksums and their record counts.
    imports: HashMap<String, usize>,
    /// Categories whose queries fail with a connection error (fault injection).
    failing_categories: HashSet<RecordCategory>,
    is_healthy: bool,
}

/// In-memory repository for testing and local development.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                is_healthy: true,
                ..Default::default()
            })),
        }
    }

    /// Simulates a total backend outage (or recovery) for testing.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().unwrap().is_healthy = healthy;
    }

    /// Makes every query for one category fail with a connection error.
    pub fn fail_category(&self, category: RecordCategory, failing: bool) {
        let mut data = self.data.write().unwrap();
        if failing {
            data.failing_categories.insert(category);
        } else {
            data.failing_categories.remove(&category);
        }
    }

    /// Creates an empty operations partition so queries against it return
    /// an empty result instead of `NotFound`.
    pub fn create_partition(&self, partition: PartitionMonth) {
        self.data
            .write()
            .unwrap()
            .operations
            .entry(partition.key())
            .or_default();
    }

    /// Seeds an operation record directly into a partition, bypassing the
    /// import pipeline. The partition may differ from the record's own date.
    pub fn seed_operation_record(&self, partition: PartitionMonth, record: OperationRecord) {
        self.data
            .write()
            .unwrap()
            .operations
            .entry(partition.key())
            .or_default()
            .push(record);
    }

    pub fn seed_fuel_record(&self, record: FuelRecord) {
        self.data.write().unwrap().fuel.push(record);
    }

    pub fn seed_repair_record(&self, record: RepairRecord) {
        self.data.write().unwrap().repairs.push(record);
    }

    /// Removes all stored data. Health and fault flags are reset too.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        *data = LocalData {
            is_healthy: true,
            ..Default::default()
        };
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if self.data.read().unwrap().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection(
                "local repository is marked unhealthy",
            ))
        }
    }

    fn check_category(&self, category: RecordCategory) -> RepositoryResult<()> {
        if self
            .data
            .read()
            .unwrap()
            .failing_categories
            .contains(&category)
        {
            return Err(RepositoryError::connection(format!(
                "{} queries are failing",
                category
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().unwrap().is_healthy)
    }

    async fn query_operation_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<OperationRecord>> {
        self.check_health()?;
        self.check_category(RecordCategory::Operations)?;

        let data = self.data.read().unwrap();
        let Some(records) = data.operations.get(&partition.key()) else {
            return Err(RepositoryError::not_found_with_context(
                format!("operations partition {} does not exist", partition),
                ErrorContext::new("query_operation_records")
                    .with_entity("operation_record")
                    .with_entity_id(partition.key()),
            ));
        };

        debug!(
            "local: {} operation records in partition {}",
            records.len(),
            partition
        );
        Ok(records
            .iter()
            .filter(|record| record.vehicle_number == vehicle_number)
            .cloned()
            .collect())
    }

    async fn query_fuel_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<FuelRecord>> {
        self.check_health()?;
        self.check_category(RecordCategory::Fuel)?;

        let year = partition.year_field();
        let month = partition.month_field();
        let data = self.data.read().unwrap();
        Ok(data
            .fuel
            .iter()
            .filter(|record| {
                record.vehicle_number == vehicle_number
                    && record.year == year
                    && record.month == month
            })
            .cloned()
            .collect())
    }

    async fn query_repair_records(
        &self,
        vehicle_number: &str,
        partition: PartitionMonth,
    ) -> RepositoryResult<Vec<RepairRecord>> {
        self.check_health()?;
        self.check_category(RecordCategory::Repairs)?;

        let year = partition.year_field();
        let month = partition.month_field();
        let data = self.data.read().unwrap();
        Ok(data
            .repairs
            .iter()
            .filter(|record| {
                record.vehicle_number == vehicle_number
                    && record.year == year
                    && record.month == month
            })
            .cloned()
            .collect())
    }

    async fn insert_operation_records(
        &self,
        partition: PartitionMonth,
        records: &[OperationRecord],
    ) -> RepositoryResult<usize> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        data.operations
            .entry(partition.key())
            .or_default()
            .extend_from_slice(records);
        Ok(records.len())
    }

    async fn insert_fuel_record(&self, record: &FuelRecord) -> RepositoryResult<()> {
        self.check_health()?;
        self.data.write().unwrap().fuel.push(record.clone());
        Ok(())
    }

    async fn insert_repair_record(&self, record: &RepairRecord) -> RepositoryResult<()> {
        self.check_health()?;
        self.data.write().unwrap().repairs.push(record.clone());
        Ok(())
    }

    async fn has_import(&self, checksum: &str) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.read().unwrap().imports.contains_key(checksum))
    }

    async fn record_import(&self, checksum: &str, record_count: usize) -> RepositoryResult<()> {
        self.check_health()?;
        self.data
            .write()
            .unwrap()
            .imports
            .insert(checksum.to_string(), record_count);
        Ok(())
    }
}

#[async_trait]
impl DriverRepository for LocalRepository {
    async fn create_driver(&self, driver: &Driver) -> RepositoryResult<Driver> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        if data.drivers.contains_key(&driver.id) {
            return Err(RepositoryError::validation(format!(
                "driver id {} already exists",
                driver.id
            )));
        }
        data.drivers.insert(driver.id.clone(), driver.clone());
        Ok(driver.clone())
    }

    async fn get_driver(&self, driver_id: &DriverId) -> RepositoryResult<Driver> {
        self.check_health()?;

        self.data
            .read()
            .unwrap()
            .drivers
            .get(driver_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("driver {} does not exist", driver_id),
                    ErrorContext::new("get_driver")
                        .with_entity("driver")
                        .with_entity_id(driver_id.as_str()),
                )
            })
    }

    async fn find_driver_by_vehicle(
        &self,
        vehicle_number: &str,
    ) -> RepositoryResult<Option<Driver>> {
        self.check_health()?;

        Ok(self
            .data
            .read()
            .unwrap()
            .drivers
            .values()
            .find(|driver| driver.vehicle_number == vehicle_number)
            .cloned())
    }

    async fn list_drivers(&self) -> RepositoryResult<Vec<Driver>> {
        self.check_health()?;

        let mut drivers: Vec<Driver> = self.data.read().unwrap().drivers.values().cloned().collect();
        drivers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(drivers)
    }

    async fn update_driver(&self, driver: &Driver) -> RepositoryResult<Driver> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        if !data.drivers.contains_key(&driver.id) {
            return Err(RepositoryError::not_found(format!(
                "driver {} does not exist",
                driver.id
            )));
        }
        data.drivers.insert(driver.id.clone(), driver.clone());
        Ok(driver.clone())
    }

    async fn delete_driver(&self, driver_id: &DriverId) -> RepositoryResult<()> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        if data.drivers.remove(driver_id).is_none() {
            return Err(RepositoryError::not_found(format!(
                "driver {} does not exist",
                driver_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation(vehicle: &str, year: &str, month: &str, day: &str) -> OperationRecord {
        OperationRecord {
            vehicle_number: vehicle.to_string(),
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
            unit_amount: 1000.0,
            chargeable_weight: 2.0,
            deducted_amount: 100.0,
        }
    }

    #[tokio::test]
    async fn missing_partition_is_not_found_but_empty_partition_is_ok() {
        let repo = LocalRepository::new();
        let partition = PartitionMonth::new(2025, 2);

        let err = repo
            .query_operation_records("V-100", partition)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));

        repo.create_partition(partition);
        let records = repo
            .query_operation_records("V-100", partition)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn operation_query_filters_by_vehicle_only() {
        let repo = LocalRepository::new();
        let partition = PartitionMonth::new(2025, 2);
        // Record dated January but stored in the February partition.
        repo.seed_operation_record(partition, operation("V-100", "2025", "01", "31"));
        repo.seed_operation_record(partition, operation("V-200", "2025", "02", "01"));

        let records = repo
            .query_operation_records("V-100", partition)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].day, "31");
    }

    #[tokio::test]
    async fn fuel_query_matches_year_and_month_fields() {
        let repo = LocalRepository::new();
        repo.seed_fuel_record(FuelRecord {
            vehicle_number: "V-100".to_string(),
            year: "2025".to_string(),
            month: "02".to_string(),
            day: "10".to_string(),
            fuel_amount: 40.0,
            fuel_price: 170.0,
            total_fuel_cost: 6800.0,
        });

        let hit = repo
            .query_fuel_records("V-100", PartitionMonth::new(2025, 2))
            .await
            .unwrap();
        assert_eq!(hit.len(), 1);

        let miss = repo
            .query_fuel_records("V-100", PartitionMonth::new(2025, 3))
            .await
            .unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn unhealthy_repository_rejects_queries() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        assert!(!repo.health_check().await.unwrap());
        let err = repo
            .query_fuel_records("V-100", PartitionMonth::new(2025, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn category_fault_only_hits_that_category() {
        let repo = LocalRepository::new();
        repo.create_partition(PartitionMonth::new(2025, 2));
        repo.fail_category(RecordCategory::Fuel, true);

        assert!(repo
            .query_fuel_records("V-100", PartitionMonth::new(2025, 2))
            .await
            .is_err());
        assert!(repo
            .query_operation_records("V-100", PartitionMonth::new(2025, 2))
            .await
            .is_ok());

        repo.fail_category(RecordCategory::Fuel, false);
        assert!(repo
            .query_fuel_records("V-100", PartitionMonth::new(2025, 2))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn import_checksums_round_trip() {
        let repo = LocalRepository::new();
        assert!(!repo.has_import("abc123").await.unwrap());
        repo.record_import("abc123", 42).await.unwrap();
        assert!(repo.has_import("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn driver_crud_round_trip() {
        let repo = LocalRepository::new();
        let driver = Driver::new("Sato", "V-100", "080-0000-0000");

        repo.create_driver(&driver).await.unwrap();
        let fetched = repo.get_driver(&driver.id).await.unwrap();
        assert_eq!(fetched.name, "Sato");

        let by_vehicle = repo.find_driver_by_vehicle("V-100").await.unwrap();
        assert_eq!(by_vehicle.unwrap().id, driver.id);

        let mut updated = fetched.clone();
        updated.phone = "090-9999-9999".to_string();
        repo.update_driver(&updated).await.unwrap();
        assert_eq!(
            repo.get_driver(&driver.id).await.unwrap().phone,
            "090-9999-9999"
        );

        repo.delete_driver(&driver.id).await.unwrap();
        let err = repo.get_driver(&driver.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn duplicate_driver_id_is_rejected() {
        let repo = LocalRepository::new();
        let driver = Driver::new("Sato", "V-100", "080-0000-0000");
        repo.create_driver(&driver).await.unwrap();

        let err = repo.create_driver(&driver).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }
}
