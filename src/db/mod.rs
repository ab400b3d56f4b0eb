//! Storage layer: repository traits, backends and construction.
//!
//! ## Layout
//!
//! - [`repository`]: the traits services depend on, plus error types
//! - [`repositories`]: concrete backends (Firestore, in-memory)
//! - [`factory`]: explicit backend selection and construction
//! - [`repo_config`]: TOML configuration loading
//! - [`checksum`]: content hashing for import deduplication

#[cfg(not(any(feature = "firestore-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature: 'firestore-repo' or 'local-repo'");

pub mod checksum;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use checksum::calculate_checksum;
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
pub use repository::{
    DriverRepository, ErrorContext, FullRepository, LedgerRepository, RepositoryError,
    RepositoryResult,
};

#[cfg(feature = "firestore-repo")]
pub use repositories::{FirestoreConfig, FirestoreRepository};

/// Placeholder config type when the Firestore backend is compiled out.
///
/// Keeps factory signatures stable across feature combinations.
#[cfg(not(feature = "firestore-repo"))]
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    _private: (),
}
