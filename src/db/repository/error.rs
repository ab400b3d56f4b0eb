//! Repository error types with rich context for debugging and telemetry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Additional context attached to repository errors.
///
/// Collected at the call site so a failure log line can name the operation,
/// the entity involved and its id without string parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// The repository operation being performed (e.g. "query_fuel_records").
    pub operation: Option<String>,
    /// The entity type involved (e.g. "operation_record", "driver").
    pub entity_type: Option<String>,
    /// The specific entity or partition id involved, if known.
    pub entity_id: Option<String>,
    /// Any additional details worth surfacing.
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.operation.is_none()
            && self.entity_type.is_none()
            && self.entity_id.is_none()
            && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(op) = &self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(entity) = &self.entity_type {
            parts.push(format!("entity={}", entity));
        }
        if let Some(id) = &self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(details) = &self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, " [{}]", parts.join(", "))
    }
}

/// Errors produced by repository implementations.
///
/// Backends map their native failures onto these variants so callers can
/// react structurally: a missing partition is `NotFound`, a transport outage
/// is `ConnectionError` or `TimeoutError`, and the two are never conflated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// Failed to reach the storage backend.
    #[error("Connection error: {message}{context}")]
    ConnectionError { message: String, context: ErrorContext },

    /// The backend rejected or failed to execute a structured query.
    #[error("Query error: {message}{context}")]
    QueryError { message: String, context: ErrorContext },

    /// The requested document or partition does not exist.
    #[error("Not found: {message}{context}")]
    NotFound { message: String, context: ErrorContext },

    /// Data failed validation before or after a storage operation.
    #[error("Validation error: {message}{context}")]
    ValidationError { message: String, context: ErrorContext },

    /// A stored document could not be mapped to its domain type.
    #[error("Serialization error: {message}{context}")]
    SerializationError { message: String, context: ErrorContext },

    /// The repository was misconfigured (missing settings, disabled feature).
    #[error("Configuration error: {message}{context}")]
    ConfigurationError { message: String, context: ErrorContext },

    /// The backend did not respond within the configured deadline.
    #[error("Timeout error: {message}{context}")]
    TimeoutError { message: String, context: ErrorContext },

    /// An unexpected internal failure.
    #[error("Internal error: {message}{context}")]
    InternalError { message: String, context: ErrorContext },
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context,
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn query_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::QueryError {
            message: message.into(),
            context,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn serialization_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::SerializationError {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Attaches or replaces the operation name on this error's context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Whether retrying the operation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError { .. } | Self::TimeoutError { .. }
        )
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::SerializationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::TimeoutError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::SerializationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::TimeoutError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }
}

/// Convenience alias used throughout the repository layer.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
