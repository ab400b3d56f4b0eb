//! HTTP server module (feature `http-server`).
//!
//! REST API over the service layer:
//!
//! - `GET  /health`: liveness and storage reachability
//! - `GET  /v1/me`: session restore
//! - `GET  /v1/me/statistics`, `GET /v1/vehicles/{vehicle_number}/statistics`
//! - `POST /v1/me/fuel`, `POST /v1/me/repairs`: driver expense entry
//! - `GET/POST /v1/drivers`, `GET/PUT/DELETE /v1/drivers/{driver_id}`
//! - `POST /v1/imports`: background transport-log import (202 + job id)
//! - `GET  /v1/jobs/{job_id}`, `GET /v1/jobs/{job_id}/logs` (SSE)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
