//! In-memory [`ProfileStore`] implementation for tests and dry runs.
//!
//! Mirrors the backend contract: indices must be created by
//! [`init_store`](ProfileStore::init_store) before writes, re-creating an
//! index is reported as a failed step, writes upsert by id, and a torn
//! down store rejects everything.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{ProfileDocument, TextDocument};
use crate::schema::{PROFILE_INDEX, TEXT_INDEX};

use super::{BootstrapReport, BootstrapStep, ProfileStore, StoreError};

type Index<T> = RwLock<Option<HashMap<i64, T>>>;

/// In-memory store keyed by column id.
pub struct InMemoryStore {
    texts: Index<TextDocument>,
    profiles: Index<ProfileDocument>,
    closed: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            texts: RwLock::new(None),
            profiles: RwLock::new(None),
            closed: false,
        }
    }

    pub fn text_document(&self, id: i64) -> Option<TextDocument> {
        let texts = self.texts.read().unwrap();
        texts.as_ref().and_then(|m| m.get(&id).cloned())
    }

    pub fn profile_document(&self, id: i64) -> Option<ProfileDocument> {
        let profiles = self.profiles.read().unwrap();
        profiles.as_ref().and_then(|m| m.get(&id).cloned())
    }

    pub fn text_count(&self) -> usize {
        self.texts.read().unwrap().as_ref().map_or(0, |m| m.len())
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.read().unwrap().as_ref().map_or(0, |m| m.len())
    }

    /// Remove a text document. Returns whether one existed.
    pub fn delete_text(&self, id: i64) -> bool {
        let mut texts = self.texts.write().unwrap();
        texts.as_mut().is_some_and(|m| m.remove(&id).is_some())
    }

    /// Remove a profile document. Returns whether one existed.
    pub fn delete_profile(&self, id: i64) -> bool {
        let mut profiles = self.profiles.write().unwrap();
        profiles.as_mut().is_some_and(|m| m.remove(&id).is_some())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn create_index<T>(index: &Index<T>, name: &str) -> Result<(), StoreError> {
    let mut guard = index.write().unwrap();
    if guard.is_some() {
        return Err(StoreError::Backend {
            status: 400,
            reason: format!("resource_already_exists_exception: index [{}] already exists", name),
        });
    }
    *guard = Some(HashMap::new());
    Ok(())
}

fn put_mapping<T>(index: &Index<T>, name: &str) -> Result<(), StoreError> {
    if index.read().unwrap().is_none() {
        return Err(index_not_found(name));
    }
    Ok(())
}

fn upsert<T>(index: &Index<T>, name: &str, id: i64, doc: T) -> Result<(), StoreError> {
    let mut guard = index.write().unwrap();
    match guard.as_mut() {
        Some(docs) => {
            docs.insert(id, doc);
            Ok(())
        }
        None => Err(index_not_found(name)),
    }
}

fn index_not_found(name: &str) -> StoreError {
    StoreError::Backend {
        status: 404,
        reason: format!("index_not_found_exception: no such index [{}]", name),
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn init_store(&self) -> Result<BootstrapReport, StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        let mut report = BootstrapReport::new();
        report.record(
            BootstrapStep::CreateTextIndex,
            create_index(&self.texts, TEXT_INDEX),
        );
        report.record(
            BootstrapStep::PutTextMapping,
            put_mapping(&self.texts, TEXT_INDEX),
        );
        report.record(
            BootstrapStep::CreateProfileIndex,
            create_index(&self.profiles, PROFILE_INDEX),
        );
        report.record(
            BootstrapStep::PutProfileMapping,
            put_mapping(&self.profiles, PROFILE_INDEX),
        );
        Ok(report)
    }

    async fn index_text(&self, doc: &TextDocument) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        upsert(&self.texts, TEXT_INDEX, doc.id, doc.clone())
    }

    async fn store_profile(&self, doc: &ProfileDocument) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        upsert(&self.profiles, PROFILE_INDEX, doc.id, doc.clone())
    }

    fn tear_down_store(&mut self) {
        self.closed = true;
        *self.texts.write().unwrap() = None;
        *self.profiles.write().unwrap() = None;
    }
}
