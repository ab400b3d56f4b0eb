//! Driver registry repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::DriverId;
use crate::models::Driver;

/// CRUD over the driver registry.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Persists a new driver. Fails with `ValidationError` if the id is taken.
    async fn create_driver(&self, driver: &Driver) -> RepositoryResult<Driver>;

    /// Fetches a driver by id. `NotFound` if no such driver exists.
    async fn get_driver(&self, driver_id: &DriverId) -> RepositoryResult<Driver>;

    /// Looks up the driver currently assigned to a vehicle, if any.
    async fn find_driver_by_vehicle(
        &self,
        vehicle_number: &str,
    ) -> RepositoryResult<Option<Driver>>;

    /// Lists all drivers, oldest registration first.
    async fn list_drivers(&self) -> RepositoryResult<Vec<Driver>>;

    /// Replaces an existing driver record. `NotFound` if the id is unknown.
    async fn update_driver(&self, driver: &Driver) -> RepositoryResult<Driver>;

    /// Deletes a driver. `NotFound` if the id is unknown.
    async fn delete_driver(&self, driver_id: &DriverId) -> RepositoryResult<()>;
}
