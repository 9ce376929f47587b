//! In-process repository implementations.
//!
//! Both stores keep records in a mutex-guarded map with the same uniqueness
//! rules as the PostgreSQL tables: one record per canonical key and one per
//! short code. Used by tests and as the fallback store when no database is
//! configured; contents are lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::canonical_key::CanonicalKey;
use crate::domain::entities::{CompositeLink, NewCompositeLink, NewSimpleLink, SimpleLink};
use crate::domain::repositories::{CompositeLinkRepository, GetOrCreate, SimpleLinkRepository};
use crate::error::AppError;
use serde_json::json;

/// Records of one kind indexed by canonical key and by code.
struct Table<T> {
    next_id: i64,
    by_key: HashMap<CanonicalKey, T>,
    key_by_code: HashMap<String, CanonicalKey>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            by_key: HashMap::new(),
            key_by_code: HashMap::new(),
        }
    }

    fn get_or_create(
        &mut self,
        key: CanonicalKey,
        code: String,
        build: impl FnOnce(i64) -> T,
    ) -> GetOrCreate<T> {
        if let Some(existing) = self.by_key.get(&key) {
            return GetOrCreate::Existing(existing.clone());
        }

        if self.key_by_code.contains_key(&code) {
            return GetOrCreate::CodeTaken;
        }

        let record = build(self.next_id);
        self.next_id += 1;
        self.key_by_code.insert(code, key.clone());
        self.by_key.insert(key, record.clone());

        GetOrCreate::Created(record)
    }

    fn find_by_code(&self, code: &str) -> Option<T> {
        self.key_by_code
            .get(code)
            .and_then(|key| self.by_key.get(key))
            .cloned()
    }

    fn delete(&mut self, code: &str) -> bool {
        match self.key_by_code.remove(code) {
            Some(key) => self.by_key.remove(&key).is_some(),
            None => false,
        }
    }

    fn count(&self) -> i64 {
        self.by_key.len() as i64
    }
}

fn lock<T>(table: &Mutex<Table<T>>) -> Result<std::sync::MutexGuard<'_, Table<T>>, AppError> {
    table
        .lock()
        .map_err(|_| AppError::store_unavailable("In-memory store poisoned", json!({})))
}

/// In-memory simple link store.
pub struct MemorySimpleLinkRepository {
    table: Mutex<Table<SimpleLink>>,
}

impl MemorySimpleLinkRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table::new()),
        }
    }
}

impl Default for MemorySimpleLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SimpleLinkRepository for MemorySimpleLinkRepository {
    async fn get_or_create(
        &self,
        new_link: NewSimpleLink,
    ) -> Result<GetOrCreate<SimpleLink>, AppError> {
        let NewSimpleLink {
            code,
            url,
            subjects,
            canonical_key,
        } = new_link;

        Ok(lock(&self.table)?.get_or_create(canonical_key, code.clone(), |id| SimpleLink {
            id,
            code,
            url,
            subjects,
            created_at: Utc::now(),
        }))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<SimpleLink>, AppError> {
        Ok(lock(&self.table)?.find_by_code(code))
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(lock(&self.table)?.delete(code))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(lock(&self.table)?.count())
    }
}

/// In-memory composite link store.
pub struct MemoryCompositeLinkRepository {
    table: Mutex<Table<CompositeLink>>,
}

impl MemoryCompositeLinkRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table::new()),
        }
    }
}

impl Default for MemoryCompositeLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompositeLinkRepository for MemoryCompositeLinkRepository {
    async fn get_or_create(
        &self,
        new_link: NewCompositeLink,
    ) -> Result<GetOrCreate<CompositeLink>, AppError> {
        let NewCompositeLink {
            code,
            has_base_calendar,
            base_url,
            base_subjects,
            extra_subjects,
            event_count,
            canonical_key,
        } = new_link;

        Ok(
            lock(&self.table)?.get_or_create(canonical_key, code.clone(), |id| CompositeLink {
                id,
                code,
                has_base_calendar,
                base_url,
                base_subjects,
                extra_subjects,
                event_count,
                created_at: Utc::now(),
            }),
        )
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<CompositeLink>, AppError> {
        Ok(lock(&self.table)?.find_by_code(code))
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(lock(&self.table)?.delete(code))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(lock(&self.table)?.count())
    }
}
