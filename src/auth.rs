//! Authentication and authorization.
//!
//! Requests carry a bearer token; a [`TokenVerifier`] turns it into a
//! [`Session`] naming the caller and their role. Admins operate the whole
//! back office; drivers may only touch their own vehicle's data.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("forbidden: {0}")]
    Forbidden(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Driver,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    /// The vehicle a driver session is bound to. `None` for admins.
    pub vehicle_number: Option<String>,
}

impl Session {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
            vehicle_number: None,
        }
    }

    pub fn driver(user_id: impl Into<String>, vehicle_number: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Driver,
            vehicle_number: Some(vehicle_number.into()),
        }
    }

    /// Checks that this session may read data for `vehicle_number`.
    pub fn authorize_vehicle(&self, vehicle_number: &str) -> Result<(), AuthError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Driver if self.vehicle_number.as_deref() == Some(vehicle_number) => Ok(()),
            Role::Driver => Err(AuthError::Forbidden(
                "drivers may only access their own vehicle".to_string(),
            )),
        }
    }

    /// Requires the admin role.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Driver => Err(AuthError::Forbidden(
                "administrator role required".to_string(),
            )),
        }
    }

    /// The vehicle bound to this session, for driver self-service endpoints.
    pub fn own_vehicle(&self) -> Result<&str, AuthError> {
        self.vehicle_number
            .as_deref()
            .ok_or_else(|| AuthError::Forbidden("no vehicle bound to this session".to_string()))
    }
}

/// Turns bearer tokens into sessions.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Session, AuthError>;
}

/// Fixed token table for development and tests.
///
/// Production deployments put a real identity provider behind
/// [`TokenVerifier`]; this one just looks tokens up in a map.
#[derive(Default)]
pub struct StaticTokenVerifier {
    sessions: HashMap<String, Session>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token/session pair (builder style, handy in tests).
    pub fn with_session(mut self, token: impl Into<String>, session: Session) -> Self {
        self.sessions.insert(token.into(), session);
        self
    }

    /// Parses the `FLEETOPS_TOKENS` format:
    /// comma-separated `token:role[:vehicle]` entries, e.g.
    /// `s3cret:admin,v100tok:driver:V-100`.
    pub fn from_spec(spec: &str) -> Result<Self, String> {
        let mut verifier = Self::new();
        for (index, entry) in spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .enumerate()
        {
            let mut parts = entry.splitn(3, ':');
            let token = parts
                .next()
                .filter(|token| !token.is_empty())
                .ok_or_else(|| format!("missing token in entry '{}'", entry))?;
            let role = parts.next().unwrap_or_default();
            let vehicle = parts.next();

            let user_id = format!("static-user-{}", index + 1);
            let session = match role {
                "admin" => Session::admin(user_id),
                "driver" => {
                    let vehicle = vehicle.filter(|v| !v.is_empty()).ok_or_else(|| {
                        format!("driver entry '{}' requires a vehicle number", entry)
                    })?;
                    Session::driver(user_id, vehicle)
                }
                other => {
                    return Err(format!(
                        "unknown role '{}' in entry '{}' (expected 'admin' or 'driver')",
                        other, entry
                    ))
                }
            };
            verifier.sessions.insert(token.to_string(), session);
        }
        Ok(verifier)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify_token(&self, token: &str) -> Result<Session, AuthError> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Extracts a [`Session`] from the `Authorization: Bearer` header.
#[cfg(feature = "http-server")]
impl axum::extract::FromRequestParts<crate::http::AppState> for Session {
    type Rejection = crate::http::error::AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &crate::http::AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(AuthError::MissingToken)?;
        Ok(state.verifier.verify_token(token.trim()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_spec_parses_admin_and_driver_entries() {
        let verifier =
            StaticTokenVerifier::from_spec("s3cret:admin, v100tok:driver:V-100").unwrap();

        let admin = verifier.verify_token("s3cret").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.vehicle_number.is_none());

        let driver = verifier.verify_token("v100tok").await.unwrap();
        assert_eq!(driver.role, Role::Driver);
        assert_eq!(driver.vehicle_number.as_deref(), Some("V-100"));

        assert!(matches!(
            verifier.verify_token("wrong").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn from_spec_rejects_malformed_entries() {
        assert!(StaticTokenVerifier::from_spec("tok:driver").is_err());
        assert!(StaticTokenVerifier::from_spec("tok:superuser").is_err());
        assert!(StaticTokenVerifier::from_spec("").unwrap().is_empty());
    }

    #[test]
    fn vehicle_authorization_rules() {
        let admin = Session::admin("a1");
        assert!(admin.authorize_vehicle("V-100").is_ok());
        assert!(admin.require_admin().is_ok());

        let driver = Session::driver("d1", "V-100");
        assert!(driver.authorize_vehicle("V-100").is_ok());
        assert!(matches!(
            driver.authorize_vehicle("V-200"),
            Err(AuthError::Forbidden(_))
        ));
        assert!(driver.require_admin().is_err());
        assert_eq!(driver.own_vehicle().unwrap(), "V-100");
        assert!(admin.own_vehicle().is_err());
    }
}
