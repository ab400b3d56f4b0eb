//! Repository factory: selects and constructs a storage backend.
//!
//! Construction is explicit; callers receive an `Arc<dyn FullRepository>`
//! and pass it down to whatever needs storage. There is no process-wide
//! repository singleton.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::info;

use crate::db::repo_config::RepositoryConfig;
use crate::db::repositories::LocalRepository;
use crate::db::repository::error::{RepositoryError, RepositoryResult};
use crate::db::repository::FullRepository;
use crate::db::FirestoreConfig;

/// Available repository backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Firestore REST backend (production).
    Firestore,
    /// In-memory backend (development and tests).
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "firestore" | "fs" => Ok(RepositoryType::Firestore),
            "local" | "memory" | "in-memory" => Ok(RepositoryType::Local),
            other => Err(format!(
                "unknown repository type: '{}' (expected 'firestore' or 'local')",
                other
            )),
        }
    }
}

impl RepositoryType {
    /// Determines the repository type from the environment.
    ///
    /// `REPOSITORY_TYPE` wins when set; otherwise the presence of
    /// `FIRESTORE_PROJECT_ID` selects Firestore, and the fallback is Local.
    pub fn from_env() -> Self {
        if let Ok(value) = env::var("REPOSITORY_TYPE") {
            if let Ok(repo_type) = value.parse() {
                return repo_type;
            }
        }
        if env::var("FIRESTORE_PROJECT_ID").is_ok() {
            RepositoryType::Firestore
        } else {
            RepositoryType::Local
        }
    }
}

/// Factory for repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Creates a repository of the requested type.
    ///
    /// `firestore_config` is required for the Firestore backend; passing
    /// `None` falls back to `FIRESTORE_*` environment variables.
    pub fn create(
        repo_type: RepositoryType,
        firestore_config: Option<FirestoreConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => {
                info!("Creating local in-memory repository");
                Ok(Self::create_local())
            }
            RepositoryType::Firestore => Self::create_firestore(firestore_config),
        }
    }

    /// Creates an empty in-memory repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    #[cfg(feature = "firestore-repo")]
    fn create_firestore(
        config: Option<FirestoreConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        use crate::db::repositories::FirestoreRepository;

        let config = match config {
            Some(config) => config,
            None => FirestoreConfig::from_env().map_err(RepositoryError::configuration)?,
        };
        info!("Creating Firestore repository");
        Ok(Arc::new(FirestoreRepository::new(config)?))
    }

    #[cfg(not(feature = "firestore-repo"))]
    fn create_firestore(
        _config: Option<FirestoreConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        Err(RepositoryError::configuration(
            "Firestore backend requested but the 'firestore-repo' feature is disabled",
        ))
    }

    /// Creates a repository based on environment variables.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_env();
        info!("Repository type from environment: {:?}", repo_type);
        Self::create(repo_type, None)
    }

    /// Creates a repository from a TOML config file.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(path)?;
        Self::from_repository_config(&config)
    }

    /// Creates a repository from `repository.toml` in a default location,
    /// falling back to environment variables when no file exists.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryConfig::from_default_location() {
            Ok(config) => Self::from_repository_config(&config),
            Err(_) => {
                info!("No repository.toml found; using environment configuration");
                Self::from_env()
            }
        }
    }

    /// Creates a repository from an already-parsed configuration.
    pub fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type()?;
        let firestore_config = config.to_firestore_config()?;
        Self::create(repo_type, firestore_config)
    }
}

/// Builder-style construction for call sites that prefer it.
#[derive(Default)]
pub struct RepositoryBuilder {
    repo_type: Option<RepositoryType>,
    firestore_config: Option<FirestoreConfig>,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, repo_type: RepositoryType) -> Self {
        self.repo_type = Some(repo_type);
        self
    }

    pub fn with_firestore_config(mut self, config: FirestoreConfig) -> Self {
        self.firestore_config = Some(config);
        self
    }

    /// Builds the repository, reading the environment for anything unset.
    pub fn build(self) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = self.repo_type.unwrap_or_else(RepositoryType::from_env);
        RepositoryFactory::create(repo_type, self.firestore_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_type_parses_aliases() {
        assert_eq!(
            "firestore".parse::<RepositoryType>().unwrap(),
            RepositoryType::Firestore
        );
        assert_eq!(
            "Local".parse::<RepositoryType>().unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            "in-memory".parse::<RepositoryType>().unwrap(),
            RepositoryType::Local
        );
        assert!("mysql".parse::<RepositoryType>().is_err());
    }

    #[tokio::test]
    async fn create_local_is_healthy() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn builder_builds_requested_type() {
        let repo = RepositoryBuilder::new()
            .with_type(RepositoryType::Local)
            .build()
            .unwrap();
        assert!(repo.health_check().await.unwrap());
    }
}
