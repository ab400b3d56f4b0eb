//! Driver registry business logic.
//!
//! Keeps the one rule the storage layer cannot enforce by itself: at most
//! one active driver per vehicle. Everything else is a thin pass-through
//! with logging.

use log::info;

use crate::api::DriverId;
use crate::db::repository::error::{RepositoryError, RepositoryResult};
use crate::db::repository::DriverRepository;
use crate::models::Driver;

/// Field-level changes applied by [`update_driver_details`].
///
/// `None` leaves the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub vehicle_number: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

/// Registers a new driver, assigning a fresh id.
///
/// Fails with `ValidationError` when the name or vehicle number is blank,
/// or when the vehicle already has an active driver.
pub async fn register_driver<R>(
    repository: &R,
    name: &str,
    vehicle_number: &str,
    phone: &str,
) -> RepositoryResult<Driver>
where
    R: DriverRepository + ?Sized,
{
    let name = name.trim();
    let vehicle_number = vehicle_number.trim();
    if name.is_empty() {
        return Err(RepositoryError::validation("driver name must not be empty"));
    }
    if vehicle_number.is_empty() {
        return Err(RepositoryError::validation(
            "vehicle number must not be empty",
        ));
    }

    ensure_vehicle_available(repository, vehicle_number, None).await?;

    let driver = Driver::new(name, vehicle_number, phone.trim());
    let created = repository.create_driver(&driver).await?;
    info!(
        "registered driver {} ({}) on vehicle {}",
        created.name, created.id, created.vehicle_number
    );
    Ok(created)
}

/// Applies a partial update to an existing driver.
///
/// Reassigning the vehicle re-checks the one-active-driver rule.
pub async fn update_driver_details<R>(
    repository: &R,
    driver_id: &DriverId,
    update: DriverUpdate,
) -> RepositoryResult<Driver>
where
    R: DriverRepository + ?Sized,
{
    let mut driver = repository.get_driver(driver_id).await?;

    if let Some(name) = update.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(RepositoryError::validation("driver name must not be empty"));
        }
        driver.name = name;
    }
    if let Some(phone) = update.phone {
        driver.phone = phone.trim().to_string();
    }
    if let Some(active) = update.active {
        driver.active = active;
    }
    if let Some(vehicle_number) = update.vehicle_number {
        let vehicle_number = vehicle_number.trim().to_string();
        if vehicle_number.is_empty() {
            return Err(RepositoryError::validation(
                "vehicle number must not be empty",
            ));
        }
        if vehicle_number != driver.vehicle_number {
            ensure_vehicle_available(repository, &vehicle_number, Some(driver_id)).await?;
        }
        driver.vehicle_number = vehicle_number;
    }

    let updated = repository.update_driver(&driver).await?;
    info!("updated driver {} ({})", updated.name, updated.id);
    Ok(updated)
}

/// Deletes a driver from the registry.
pub async fn remove_driver<R>(repository: &R, driver_id: &DriverId) -> RepositoryResult<()>
where
    R: DriverRepository + ?Sized,
{
    repository.delete_driver(driver_id).await?;
    info!("deleted driver {}", driver_id);
    Ok(())
}

async fn ensure_vehicle_available<R>(
    repository: &R,
    vehicle_number: &str,
    reassigning_from: Option<&DriverId>,
) -> RepositoryResult<()>
where
    R: DriverRepository + ?Sized,
{
    if let Some(existing) = repository.find_driver_by_vehicle(vehicle_number).await? {
        let same_driver = reassigning_from == Some(&existing.id);
        if existing.active && !same_driver {
            return Err(RepositoryError::validation(format!(
                "vehicle {} is already assigned to driver {} ({})",
                vehicle_number, existing.name, existing.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;

    #[tokio::test]
    async fn register_rejects_double_assignment() {
        let repo = LocalRepository::new();
        register_driver(&repo, "Sato", "V-100", "080-0000-0000")
            .await
            .unwrap();

        let err = register_driver(&repo, "Tanaka", "V-100", "080-1111-1111")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn inactive_driver_releases_the_vehicle() {
        let repo = LocalRepository::new();
        let sato = register_driver(&repo, "Sato", "V-100", "080-0000-0000")
            .await
            .unwrap();

        update_driver_details(
            &repo,
            &sato.id,
            DriverUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // The vehicle is free again.
        register_driver(&repo, "Tanaka", "V-100", "080-1111-1111")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_checks_vehicle_when_reassigning() {
        let repo = LocalRepository::new();
        let sato = register_driver(&repo, "Sato", "V-100", "080-0000-0000")
            .await
            .unwrap();
        register_driver(&repo, "Tanaka", "V-200", "080-1111-1111")
            .await
            .unwrap();

        let err = update_driver_details(
            &repo,
            &sato.id,
            DriverUpdate {
                vehicle_number: Some("V-200".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));

        // Keeping the same vehicle is not a reassignment.
        let same = update_driver_details(
            &repo,
            &sato.id,
            DriverUpdate {
                vehicle_number: Some("V-100".to_string()),
                name: Some("Sato Ichiro".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(same.name, "Sato Ichiro");
    }

    #[tokio::test]
    async fn register_rejects_blank_fields() {
        let repo = LocalRepository::new();
        assert!(register_driver(&repo, "  ", "V-100", "").await.is_err());
        assert!(register_driver(&repo, "Sato", "", "").await.is_err());
    }
}
