//! Repository abstractions.
//!
//! Services depend on these traits, never on a concrete backend. The store
//! is swappable: Firestore in production, in-memory for tests and local
//! development. Construction goes through [`crate::db::factory`]; nothing in
//! this crate holds a global repository instance.

pub mod drivers;
pub mod error;
pub mod ledger;

pub use drivers::DriverRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use ledger::LedgerRepository;

/// The full storage surface: ledgers plus the driver registry.
///
/// Handlers hold an `Arc<dyn FullRepository>`; services that only read
/// ledgers take the narrower [`LedgerRepository`] bound so a fake ledger is
/// enough to test them.
pub trait FullRepository: LedgerRepository + DriverRepository + std::fmt::Debug {}

impl<T> FullRepository for T where T: LedgerRepository + DriverRepository + std::fmt::Debug {}
