#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use pooled_shortener::application::services::{AccessRecorder, LayeredResolver};
use pooled_shortener::codegen::CodeSpec;
use pooled_shortener::domain::access_event::AccessEvent;
use pooled_shortener::domain::entities::{Mapping, NewMapping};
use pooled_shortener::domain::repositories::MappingRepository;
use pooled_shortener::error::AppError;
use pooled_shortener::infrastructure::cache::LruCache;
use pooled_shortener::pool::{CodePool, CursorStore, FileBatchLoader};
use pooled_shortener::state::AppState;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Mapping store kept in memory, counting reads so tests can tell cache hits
/// from store lookups.
#[derive(Default)]
pub struct InMemoryMappingRepository {
    mappings: Mutex<Vec<Mapping>>,
    pub find_calls: AtomicUsize,
    pub unreachable: AtomicBool,
}

impl InMemoryMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, short_code: &str, long_url: &str, expires_at: DateTime<Utc>) {
        let mut mappings = self.mappings.lock();
        let now = Utc::now();
        let id = mappings.len() as i64 + 1;
        mappings.push(Mapping {
            id,
            short_code: short_code.to_string(),
            long_url: long_url.to_string(),
            access_count: 0,
            expires_at,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn get(&self, short_code: &str) -> Option<Mapping> {
        self.mappings
            .lock()
            .iter()
            .find(|m| m.short_code == short_code)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.mappings.lock().len()
    }

    pub fn finds(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), AppError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", json!({})));
        }
        Ok(())
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappingRepository {
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError> {
        self.check_reachable()?;
        if self.get(&new_mapping.short_code).is_some() {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "idx_url_mappings_short_code" }),
            ));
        }

        self.insert(
            &new_mapping.short_code,
            &new_mapping.long_url,
            new_mapping.expires_at,
        );
        self.get(&new_mapping.short_code)
            .ok_or_else(|| AppError::internal("Database error", json!({})))
    }

    async fn find_active(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Mapping>, AppError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.get(short_code).filter(|m| !m.is_expired_at(now)))
    }

    async fn increment_access_count(&self, short_code: &str) -> Result<(), AppError> {
        self.check_reachable()?;
        if let Some(m) = self
            .mappings
            .lock()
            .iter_mut()
            .find(|m| m.short_code == short_code)
        {
            m.access_count += 1;
        }
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        self.check_reachable()?;
        Ok(self.len() as i64)
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64, AppError> {
        self.check_reachable()?;
        Ok(self
            .mappings
            .lock()
            .iter()
            .filter(|m| !m.is_expired_at(now))
            .count() as i64)
    }

    async fn sum_access_count(&self) -> Result<i64, AppError> {
        self.check_reachable()?;
        Ok(self.mappings.lock().iter().map(|m| m.access_count).sum())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_reachable()
    }
}

/// Everything a handler test needs besides the state itself.
pub struct TestContext {
    pub repository: Arc<InMemoryMappingRepository>,
    pub access_rx: mpsc::Receiver<AccessEvent>,
    pub dir: TempDir,
}

/// Writes `codes` into a fresh pool file inside `dir`.
pub fn write_pool(dir: &TempDir, codes: &[&str]) -> FileBatchLoader {
    let pool_path = dir.path().join("shorturls.dat");
    fs::write(&pool_path, codes.concat()).unwrap();
    FileBatchLoader::new(pool_path, CursorStore::new(dir.path().join("offset.dat")), 6)
}

/// Builds state over an in-memory store and a pool file holding `codes`.
///
/// The pool is initialized before returning. `threshold` 0 keeps background
/// refills out of the way.
pub async fn create_test_state(codes: &[&str], base_url: Option<&str>) -> (AppState, TestContext) {
    let dir = tempfile::tempdir().unwrap();
    let loader = write_pool(&dir, codes);
    let pool = CodePool::new(Arc::new(loader), 0, 100);
    pool.init().await.unwrap();

    let repository = Arc::new(InMemoryMappingRepository::new());
    let resolver = Arc::new(LayeredResolver::new(
        repository.clone() as Arc<dyn MappingRepository>,
        Arc::new(LruCache::new(100)),
        Duration::days(730),
    ));

    let (access_tx, access_rx) = mpsc::channel(16);
    let state = AppState::new(
        pool,
        resolver,
        AccessRecorder::new(access_tx),
        CodeSpec::default(),
        base_url.map(str::to_string),
    );

    (
        state,
        TestContext {
            repository,
            access_rx,
            dir,
        },
    )
}
