//! Storage abstraction for profiling results.
//!
//! The [`ProfileStore`] trait is the capability the profiling pipeline
//! depends on: bootstrap the schema, upsert a column's sample text,
//! upsert a column's statistics, and release the backend.
//!
//! Implementations must be `Send + Sync`: once [`init_store`] has returned,
//! writes may be issued concurrently from many tasks. Concurrent writes to
//! the same id resolve last-write-wins at the backend.
//!
//! [`init_store`]: ProfileStore::init_store

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ProfileDocument, TextDocument};

/// Failure of a store operation.
///
/// Every variant is recoverable by the caller: a failed write means the
/// column was not persisted, not that the profiling task must stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached, or the transport failed mid-request.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request ({status}): {reason}")]
    Backend { status: u16, reason: String },

    /// One schema step failed during [`ProfileStore::init_store`].
    #[error("schema bootstrap step '{step}' failed: {reason}")]
    SchemaBootstrap { step: BootstrapStep, reason: String },

    /// The store was torn down.
    #[error("store closed")]
    Closed,
}

/// One independent step of schema bootstrap, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStep {
    CreateTextIndex,
    PutTextMapping,
    /// Creates the profile index together with its analysis settings.
    CreateProfileIndex,
    PutProfileMapping,
}

impl BootstrapStep {
    pub const ALL: [BootstrapStep; 4] = [
        BootstrapStep::CreateTextIndex,
        BootstrapStep::PutTextMapping,
        BootstrapStep::CreateProfileIndex,
        BootstrapStep::PutProfileMapping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapStep::CreateTextIndex => "create_text_index",
            BootstrapStep::PutTextMapping => "put_text_mapping",
            BootstrapStep::CreateProfileIndex => "create_profile_index",
            BootstrapStep::PutProfileMapping => "put_profile_mapping",
        }
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of every bootstrap step.
///
/// A failed step does not stop the remaining ones. The failure reason is
/// whatever the backend reported; an index that already existed shows up
/// as a failure with the backend's own error type, and telling that
/// apart from a genuine failure is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    outcomes: Vec<(BootstrapStep, Result<(), StoreError>)>,
}

impl BootstrapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: BootstrapStep, outcome: Result<(), StoreError>) {
        let outcome = outcome.map_err(|e| match e {
            StoreError::SchemaBootstrap { .. } => e,
            other => StoreError::SchemaBootstrap {
                step,
                reason: other.to_string(),
            },
        });
        self.outcomes.push((step, outcome));
    }

    pub fn outcomes(&self) -> &[(BootstrapStep, Result<(), StoreError>)] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &StoreError> {
        self.outcomes.iter().filter_map(|(_, r)| r.as_ref().err())
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|(_, r)| r.is_ok())
    }

    pub fn succeeded(&self, step: BootstrapStep) -> bool {
        self.outcomes
            .iter()
            .any(|(s, r)| *s == step && r.is_ok())
    }
}

/// Abstract persistence backend for column profiles.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`init_store`](ProfileStore::init_store) | Ensure both indices, mappings, and the analyzer exist |
/// | [`index_text`](ProfileStore::index_text) | Upsert a column's sample text by id |
/// | [`store_profile`](ProfileStore::store_profile) | Upsert a column's statistics by id |
/// | [`tear_down_store`](ProfileStore::tear_down_store) | Release the backend connection |
///
/// `init_store` must complete before any write; stores do not
/// auto-initialize. After `tear_down_store`, every operation fails with
/// [`StoreError::Closed`] without touching the backend.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Idempotently create the schema. Never destroys existing data.
    ///
    /// Returns `Err` only when the store is closed; individual step
    /// failures are reported in the [`BootstrapReport`].
    async fn init_store(&self) -> Result<BootstrapReport, StoreError>;

    /// Upsert the free-text document for a column, keyed by `doc.id`.
    async fn index_text(&self, doc: &TextDocument) -> Result<(), StoreError>;

    /// Upsert the statistics document for a column, keyed by `doc.id`.
    async fn store_profile(&self, doc: &ProfileDocument) -> Result<(), StoreError>;

    /// Release the backend. Later calls fail with [`StoreError::Closed`].
    fn tear_down_store(&mut self);
}
