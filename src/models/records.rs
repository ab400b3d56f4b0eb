//! Ledger record types.
//!
//! All three categories carry their logical date as zero-padded string
//! fields, matching the document store schema. Field names serialize in
//! camelCase because the stored documents and the JSON API share that
//! contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::date::{CalendarDate, DateError};

/// The three ledger categories aggregated into period statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordCategory {
    Operations,
    Fuel,
    Repairs,
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordCategory::Operations => "operations",
            RecordCategory::Fuel => "fuel",
            RecordCategory::Repairs => "repairs",
        };
        write!(f, "{}", name)
    }
}

/// One transport operation (a delivery run) from an imported transport log.
///
/// Operation records live in monthly partitions under
/// `operations/{year}-{month}/records`. The partition reflects the month the
/// record was *entered*, which can trail the logical date on its own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub vehicle_number: String,
    pub year: String,
    pub month: String,
    pub day: String,
    /// Freight rate per unit of chargeable weight.
    pub unit_amount: f64,
    pub chargeable_weight: f64,
    /// Amount withheld from the driver for this run (tolls, advances).
    pub deducted_amount: f64,
}

impl OperationRecord {
    /// Revenue contributed by this record: unit amount times weight.
    pub fn revenue(&self) -> f64 {
        self.unit_amount * self.chargeable_weight
    }

    /// The record's logical date, reconstructed from its own fields.
    pub fn logical_date(&self) -> Result<CalendarDate, DateError> {
        CalendarDate::from_storage_fields(&self.year, &self.month, &self.day)
    }
}

/// A fuel purchase entered by a driver from the mobile app.
///
/// Fuel records live in one flat collection and are queried by their own
/// `year`/`month` fields. `total_fuel_cost` is authoritative: it is written
/// at entry time and may legitimately differ from `fuel_amount * fuel_price`
/// (station discounts, rounding at the pump).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelRecord {
    pub vehicle_number: String,
    pub year: String,
    pub month: String,
    pub day: String,
    /// Litres purchased.
    pub fuel_amount: f64,
    /// Price per litre at the pump.
    pub fuel_price: f64,
    /// Total paid, as recorded at entry time.
    pub total_fuel_cost: f64,
}

impl FuelRecord {
    pub fn logical_date(&self) -> Result<CalendarDate, DateError> {
        CalendarDate::from_storage_fields(&self.year, &self.month, &self.day)
    }
}

/// A repair expense entered by a driver from the mobile app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRecord {
    pub vehicle_number: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub repair_cost: f64,
}

impl RepairRecord {
    pub fn logical_date(&self) -> Result<CalendarDate, DateError> {
        CalendarDate::from_storage_fields(&self.year, &self.month, &self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_revenue_is_rate_times_weight() {
        let record = OperationRecord {
            vehicle_number: "V-100".to_string(),
            year: "2025".to_string(),
            month: "01".to_string(),
            day: "31".to_string(),
            unit_amount: 1200.0,
            chargeable_weight: 4.5,
            deducted_amount: 300.0,
        };
        assert_eq!(record.revenue(), 5400.0);
        assert_eq!(
            record.logical_date().unwrap(),
            CalendarDate::new(2025, 1, 31).unwrap()
        );
    }

    #[test]
    fn logical_date_surfaces_malformed_fields() {
        let record = RepairRecord {
            vehicle_number: "V-100".to_string(),
            year: "2025".to_string(),
            month: "02".to_string(),
            day: "30".to_string(),
            repair_cost: 8000.0,
        };
        assert!(record.logical_date().is_err());
    }

    #[test]
    fn records_serialize_with_camel_case_keys() {
        let record = FuelRecord {
            vehicle_number: "V-100".to_string(),
            year: "2025".to_string(),
            month: "03".to_string(),
            day: "02".to_string(),
            fuel_amount: 50.0,
            fuel_price: 1800.0,
            total_fuel_cost: 90000.0,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["vehicleNumber"], "V-100");
        assert_eq!(value["totalFuelCost"], 90000.0);
        assert!(value.get("total_fuel_cost").is_none());
    }
}
