//! Repository implementations module.
//!
//! This module contains the implementations of the storage traits:
//! - `firestore`: Firestore REST backend for production
//! - `local`: In-memory implementation for unit testing and local development

#[cfg(feature = "firestore-repo")]
pub mod firestore;
pub mod local;

#[cfg(feature = "firestore-repo")]
pub use firestore::{FirestoreConfig, FirestoreRepository};
pub use local::LocalRepository;
