//! # Profile Store Core
//!
//! Backend-agnostic logic for persisting column profiling results:
//! task descriptors, the two document shapes, the index schema, and the
//! store trait.
//!
//! This crate performs no network or filesystem I/O. The search-engine
//! backend lives in the `profile-store` crate.

pub mod models;
pub mod schema;
pub mod store;
pub mod task;
