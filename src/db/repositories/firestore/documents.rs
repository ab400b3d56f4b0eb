//! Mapping between Firestore REST documents and domain types.
//!
//! Firestore wraps every field in a typed value object
//! (`{"stringValue": ...}`, `{"doubleValue": ...}`) and encodes int64 as a
//! decimal string. The helpers here convert both directions and surface
//! schema mismatches as `SerializationError`.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::api::DriverId;
use crate::db::repository::error::{RepositoryError, RepositoryResult};
use crate::models::{Driver, FuelRecord, OperationRecord, RepairRecord};

pub(super) fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

pub(super) fn double_value(value: f64) -> Value {
    json!({ "doubleValue": value })
}

pub(super) fn integer_value(value: i64) -> Value {
    // int64 travels as a decimal string on the REST API.
    json!({ "integerValue": value.to_string() })
}

pub(super) fn bool_value(value: bool) -> Value {
    json!({ "booleanValue": value })
}

fn field<'a>(document: &'a Value, name: &str) -> RepositoryResult<&'a Value> {
    document
        .get("fields")
        .and_then(|fields| fields.get(name))
        .ok_or_else(|| {
            RepositoryError::serialization(format!("document is missing field '{}'", name))
        })
}

pub(super) fn string_field(document: &Value, name: &str) -> RepositoryResult<String> {
    field(document, name)?
        .get("stringValue")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            RepositoryError::serialization(format!("field '{}' is not a string", name))
        })
}

pub(super) fn number_field(document: &Value, name: &str) -> RepositoryResult<f64> {
    let value = field(document, name)?;
    if let Some(number) = value.get("doubleValue").and_then(Value::as_f64) {
        return Ok(number);
    }
    if let Some(number) = value
        .get("integerValue")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<f64>().ok())
    {
        return Ok(number);
    }
    Err(RepositoryError::serialization(format!(
        "field '{}' is not numeric",
        name
    )))
}

pub(super) fn bool_field(document: &Value, name: &str) -> RepositoryResult<bool> {
    field(document, name)?
        .get("booleanValue")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            RepositoryError::serialization(format!("field '{}' is not a boolean", name))
        })
}

fn timestamp_field(document: &Value, name: &str) -> RepositoryResult<DateTime<Utc>> {
    let raw = string_field(document, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| {
            RepositoryError::serialization(format!(
                "field '{}' is not an RFC 3339 timestamp: {}",
                name, err
            ))
        })
}

// ==================== Query filters ====================

/// A `fieldFilter` equality predicate for `structuredQuery.where`.
pub(super) fn field_equals(path: &str, value: Value) -> Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": path },
            "op": "EQUAL",
            "value": value,
        }
    })
}

/// Combines filters with a composite AND.
pub(super) fn all_of(filters: Vec<Value>) -> Value {
    json!({
        "compositeFilter": {
            "op": "AND",
            "filters": filters,
        }
    })
}

// ==================== Operation records ====================

pub(super) fn operation_from_document(document: &Value) -> RepositoryResult<OperationRecord> {
    Ok(OperationRecord {
        vehicle_number: string_field(document, "vehicleNumber")?,
        year: string_field(document, "year")?,
        month: string_field(document, "month")?,
        day: string_field(document, "day")?,
        unit_amount: number_field(document, "unitAmount")?,
        chargeable_weight: number_field(document, "chargeableWeight")?,
        deducted_amount: number_field(document, "deductedAmount")?,
    })
}

pub(super) fn operation_to_fields(record: &OperationRecord) -> Value {
    json!({
        "vehicleNumber": string_value(&record.vehicle_number),
        "year": string_value(&record.year),
        "month": string_value(&record.month),
        "day": string_value(&record.day),
        "unitAmount": double_value(record.unit_amount),
        "chargeableWeight": double_value(record.chargeable_weight),
        "deductedAmount": double_value(record.deducted_amount),
    })
}

// ==================== Fuel records ====================

pub(super) fn fuel_from_document(document: &Value) -> RepositoryResult<FuelRecord> {
    Ok(FuelRecord {
        vehicle_number: string_field(document, "vehicleNumber")?,
        year: string_field(document, "year")?,
        month: string_field(document, "month")?,
        day: string_field(document, "day")?,
        fuel_amount: number_field(document, "fuelAmount")?,
        fuel_price: number_field(document, "fuelPrice")?,
        total_fuel_cost: number_field(document, "totalFuelCost")?,
    })
}

pub(super) fn fuel_to_fields(record: &FuelRecord) -> Value {
    json!({
        "vehicleNumber": string_value(&record.vehicle_number),
        "year": string_value(&record.year),
        "month": string_value(&record.month),
        "day": string_value(&record.day),
        "fuelAmount": double_value(record.fuel_amount),
        "fuelPrice": double_value(record.fuel_price),
        "totalFuelCost": double_value(record.total_fuel_cost),
    })
}

// ==================== Repair records ====================

pub(super) fn repair_from_document(document: &Value) -> RepositoryResult<RepairRecord> {
    Ok(RepairRecord {
        vehicle_number: string_field(document, "vehicleNumber")?,
        year: string_field(document, "year")?,
        month: string_field(document, "month")?,
        day: string_field(document, "day")?,
        repair_cost: number_field(document, "repairCost")?,
    })
}

pub(super) fn repair_to_fields(record: &RepairRecord) -> Value {
    json!({
        "vehicleNumber": string_value(&record.vehicle_number),
        "year": string_value(&record.year),
        "month": string_value(&record.month),
        "day": string_value(&record.day),
        "repairCost": double_value(record.repair_cost),
    })
}

// ==================== Drivers ====================

pub(super) fn driver_from_document(document: &Value) -> RepositoryResult<Driver> {
    Ok(Driver {
        id: DriverId::new(string_field(document, "id")?),
        name: string_field(document, "name")?,
        vehicle_number: string_field(document, "vehicleNumber")?,
        phone: string_field(document, "phone")?,
        active: bool_field(document, "active")?,
        created_at: timestamp_field(document, "createdAt")?,
    })
}

pub(super) fn driver_to_fields(driver: &Driver) -> Value {
    json!({
        "id": string_value(driver.id.as_str()),
        "name": string_value(&driver.name),
        "vehicleNumber": string_value(&driver.vehicle_number),
        "phone": string_value(&driver.phone),
        "active": bool_value(driver.active),
        "createdAt": string_value(&driver.created_at.to_rfc3339()),
    })
}
