//! Driver registry entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::DriverId;

/// A registered driver and the vehicle assigned to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    /// The vehicle this driver operates. Ledger records key on this value.
    pub vehicle_number: String,
    pub phone: String,
    /// Inactive drivers keep their history but release their vehicle.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// Creates a new active driver with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        vehicle_number: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: DriverId::generate(),
            name: name.into(),
            vehicle_number: vehicle_number.into(),
            phone: phone.into(),
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_driver_is_active_with_unique_id() {
        let a = Driver::new("Sato", "V-100", "080-0000-0000");
        let b = Driver::new("Tanaka", "V-101", "080-1111-1111");
        assert!(a.active);
        assert_ne!(a.id, b.id);
        assert_eq!(a.vehicle_number, "V-100");
    }
}
