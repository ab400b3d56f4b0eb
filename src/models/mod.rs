//! Domain model types shared across repositories, services and the HTTP API.

pub mod date;
pub mod driver;
pub mod records;
pub mod statistics;

pub use date::{CalendarDate, DateError, DateRange, PartitionMonth, RangePreset};
pub use driver::Driver;
pub use records::{FuelRecord, OperationRecord, RecordCategory, RepairRecord};
pub use statistics::PeriodStatistics;
