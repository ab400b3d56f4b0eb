//! Repository configuration loading from TOML files.
//!
//! Example:
//!
//! ```toml
//! [repository]
//! type = "firestore"
//!
//! [firestore]
//! project_id = "fleetops-prod"
//! database_id = "(default)"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::factory::RepositoryType;
use crate::db::repository::error::{RepositoryError, RepositoryResult};

/// Top-level repository configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub firestore: Option<FirestoreSettings>,
}

/// `[repository]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    /// Backend selector: "firestore" or "local".
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// `[firestore]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreSettings {
    pub project_id: String,
    #[serde(default = "default_database_id")]
    pub database_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl RepositoryConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|err| {
            RepositoryError::configuration(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> RepositoryResult<Self> {
        toml::from_str(content).map_err(|err| {
            RepositoryError::configuration(format!("invalid repository config: {}", err))
        })
    }

    /// Searches the usual locations for `repository.toml`.
    pub fn from_default_location() -> RepositoryResult<Self> {
        let candidates = [
            "repository.toml",
            "./repository.toml",
            "config/repository.toml",
            "../repository.toml",
        ];
        for candidate in candidates {
            if Path::new(candidate).exists() {
                return Self::from_file(candidate);
            }
        }
        Err(RepositoryError::configuration(
            "no repository.toml found in default locations",
        ))
    }

    /// The backend selected by the `[repository]` section.
    pub fn repository_type(&self) -> RepositoryResult<RepositoryType> {
        self.repository
            .repo_type
            .parse()
            .map_err(RepositoryError::configuration)
    }

    /// Converts the `[firestore]` section into a backend config.
    #[cfg(feature = "firestore-repo")]
    pub fn to_firestore_config(
        &self,
    ) -> RepositoryResult<Option<crate::db::repositories::FirestoreConfig>> {
        use crate::db::repositories::FirestoreConfig;

        let Some(settings) = &self.firestore else {
            return Ok(None);
        };
        Ok(Some(FirestoreConfig {
            project_id: settings.project_id.clone(),
            database_id: settings.database_id.clone(),
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            request_timeout_secs: settings.request_timeout_secs,
            connect_timeout_secs: settings.connect_timeout_secs,
        }))
    }

    #[cfg(not(feature = "firestore-repo"))]
    pub fn to_firestore_config(&self) -> RepositoryResult<Option<crate::db::FirestoreConfig>> {
        if self.firestore.is_some() && self.repository.repo_type == "firestore" {
            return Err(RepositoryError::configuration(
                "config selects the Firestore backend but the 'firestore-repo' feature is disabled",
            ));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_config() {
        let config = RepositoryConfig::from_str(
            r#"
            [repository]
            type = "local"
            "#,
        )
        .unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert!(config.firestore.is_none());
    }

    #[test]
    fn parses_firestore_config_with_defaults() {
        let config = RepositoryConfig::from_str(
            r#"
            [repository]
            type = "firestore"

            [firestore]
            project_id = "fleetops-prod"
            "#,
        )
        .unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Firestore);

        let settings = config.firestore.as_ref().unwrap();
        assert_eq!(settings.project_id, "fleetops-prod");
        assert_eq!(settings.database_id, "(default)");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn rejects_unknown_repository_type() {
        let config = RepositoryConfig::from_str(
            r#"
            [repository]
            type = "couchdb"
            "#,
        )
        .unwrap();
        assert!(config.repository_type().is_err());
    }

    #[test]
    fn rejects_garbage_toml() {
        assert!(RepositoryConfig::from_str("not toml at all [").is_err());
    }
}
