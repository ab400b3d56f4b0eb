//! Request and response types for the REST API.

use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::models::{CalendarDate, DateRange, PeriodStatistics, RangePreset};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Query parameters for the statistics endpoints.
///
/// Either `preset` or both `start` and `end` must be supplied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub preset: Option<String>,
}

impl StatisticsQuery {
    /// Resolves the query into a concrete date range.
    ///
    /// Presets win over explicit dates when both are present, matching the
    /// dashboard's quick-select behavior. Range validity (ordering, future
    /// end) is the statistics service's job; this only parses.
    pub fn resolve(&self, today: CalendarDate) -> Result<DateRange, AppError> {
        if let Some(preset) = &self.preset {
            let preset: RangePreset = preset.parse().map_err(AppError::InvalidInput)?;
            return Ok(preset.resolve(today));
        }

        let (Some(start), Some(end)) = (&self.start, &self.end) else {
            return Err(AppError::InvalidInput(
                "either 'preset' or both 'start' and 'end' are required".to_string(),
            ));
        };
        let start = CalendarDate::parse_iso(start)
            .map_err(|err| AppError::InvalidInput(format!("start: {}", err)))?;
        let end = CalendarDate::parse_iso(end)
            .map_err(|err| AppError::InvalidInput(format!("end: {}", err)))?;
        Ok(DateRange::new(start, end))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub vehicle_number: String,
    pub start: String,
    pub end: String,
    pub statistics: PeriodStatistics,
}

/// Fuel expense submitted from the mobile app.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEntryRequest {
    /// Expense date, ISO `YYYY-MM-DD`.
    pub date: String,
    pub fuel_amount: f64,
    pub fuel_price: f64,
    /// Total actually paid. Defaults to `fuel_amount * fuel_price` when the
    /// receipt total is not entered separately.
    pub total_fuel_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairEntryRequest {
    pub date: String,
    pub repair_cost: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    pub name: String,
    pub vehicle_number: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverRequest {
    pub name: Option<String>,
    pub vehicle_number: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverListResponse {
    pub drivers: Vec<crate::models::Driver>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Raw transport-log CSV text.
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub job_id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    #[test]
    fn explicit_dates_resolve() {
        let query = StatisticsQuery {
            start: Some("2025-01-01".to_string()),
            end: Some("2025-01-31".to_string()),
            preset: None,
        };
        let range = query.resolve(date(2025, 3, 15)).unwrap();
        assert_eq!(range, DateRange::new(date(2025, 1, 1), date(2025, 1, 31)));
    }

    #[test]
    fn preset_wins_over_dates() {
        let query = StatisticsQuery {
            start: Some("2025-01-01".to_string()),
            end: Some("2025-01-31".to_string()),
            preset: Some("today".to_string()),
        };
        let today = date(2025, 3, 15);
        assert_eq!(query.resolve(today).unwrap(), DateRange::new(today, today));
    }

    #[test]
    fn missing_parameters_are_invalid_input() {
        let query = StatisticsQuery {
            start: Some("2025-01-01".to_string()),
            end: None,
            preset: None,
        };
        assert!(matches!(
            query.resolve(date(2025, 3, 15)),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn malformed_dates_are_invalid_input() {
        let query = StatisticsQuery {
            start: Some("01/01/2025".to_string()),
            end: Some("2025-01-31".to_string()),
            preset: None,
        };
        assert!(matches!(
            query.resolve(date(2025, 3, 15)),
            Err(AppError::InvalidInput(_))
        ));

        let query = StatisticsQuery {
            preset: Some("fortnight".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.resolve(date(2025, 3, 15)),
            Err(AppError::InvalidInput(_))
        ));
    }
}
