//! # FleetOps Backend
//!
//! Back-office service for a transport fleet: period statistics over
//! operation, fuel and repair ledgers, driver registry management, and
//! transport-log imports.
//!
//! ## Architecture
//!
//! - `models`: domain value objects (calendar dates, ledger records, statistics)
//! - `db`: repository traits and storage backends (Firestore, in-memory)
//! - `services`: business logic independent of any storage backend
//! - `auth`: token verification and per-role access rules
//! - `http`: axum REST API (feature `http-server`)
//!
//! ## Features
//!
//! - `local-repo` (default): in-memory repository for development and tests
//! - `firestore-repo`: Firestore REST backend for production
//! - `http-server` (default): HTTP server with SSE job-log streaming

pub mod api;
pub mod auth;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
