//! Public API surface of the FleetOps backend.
//!
//! Downstream code (the HTTP server binary, integration tests) should prefer
//! these re-exports over reaching into submodules.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::models::{
    CalendarDate, DateError, DateRange, Driver, FuelRecord, OperationRecord, PartitionMonth,
    PeriodStatistics, RangePreset, RecordCategory, RepairRecord,
};
pub use crate::services::statistics::{
    compute_statistics, compute_statistics_with_options, enumerate_probe_months, StatisticsError,
    StatisticsOptions,
};

/// Identifier of a driver registry entry (the document key in storage).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub String);

impl DriverId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a random id for a newly registered driver.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DriverId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DriverId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
