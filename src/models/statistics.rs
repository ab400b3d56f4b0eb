//! Aggregated period statistics.

use serde::{Deserialize, Serialize};

/// The figures shown on the vehicle statistics screen for one period.
///
/// All amounts are currency values. `management_fee` is the only rounded
/// figure; the rest are raw sums over the records that fell inside the
/// requested range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatistics {
    /// Sum of `unit_amount * chargeable_weight` over operation records.
    pub total_amount: f64,
    /// 5% of `total_amount`, rounded half away from zero.
    pub management_fee: f64,
    /// Sum of deductions withheld from the driver.
    pub deducted_amount: f64,
    pub total_fuel_cost: f64,
    pub total_repair_cost: f64,
    /// Number of records that contributed to the figures above.
    pub record_count: usize,
}

impl PeriodStatistics {
    /// True when no record in any category fell inside the period.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_statistics_are_empty() {
        let stats = PeriodStatistics::default();
        assert!(stats.is_empty());
        assert_eq!(stats.total_amount, 0.0);
        assert_eq!(stats.management_fee, 0.0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let stats = PeriodStatistics {
            total_amount: 409.9,
            management_fee: 20.0,
            deducted_amount: 10.0,
            total_fuel_cost: 90000.0,
            total_repair_cost: 0.0,
            record_count: 3,
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["totalAmount"], 409.9);
        assert_eq!(value["managementFee"], 20.0);
        assert_eq!(value["recordCount"], 3);
    }
}
