//! Exercise store
//!
//! One JSON document maps each day to its ordered exercise list. The whole
//! document is rewritten on every mutation, under a single process-wide
//! write lock.

mod schema;

pub use schema::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("No exercise #{index} on {day}")]
    ExerciseNotFound { day: Day, index: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe handle to the exercise store
#[derive(Clone)]
pub struct ExerciseStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    week: RwLock<WeekPlan>,
    /// Successful saves since load
    revision: AtomicU64,
}

impl ExerciseStore {
    /// Load the store from `path`.
    ///
    /// A missing or malformed document is replaced by seven empty days,
    /// which are written back immediately.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let (week, needs_write) = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<WeekPlan>(&bytes) {
                Ok(week) => (week, false),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Malformed exercise store, resetting");
                    (WeekPlan::new(), true)
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No exercise store yet, creating");
                (WeekPlan::new(), true)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable exercise store, resetting");
                (WeekPlan::new(), true)
            }
        };

        let store = Self {
            inner: Arc::new(StoreInner {
                path,
                week: RwLock::new(week),
                revision: AtomicU64::new(0),
            }),
        };

        if needs_write {
            if let Err(e) = store.save() {
                tracing::error!(error = %e, "Failed to write default exercise store");
            }
        }

        store
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Number of successful saves since load
    #[allow(dead_code)] // Used by tests
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    /// Run `f` against the current contents under the shared read lock
    pub fn read<R>(&self, f: impl FnOnce(&WeekPlan) -> R) -> R {
        f(&*self.read_lock())
    }

    /// Copy of one day's exercises
    #[allow(dead_code)] // Used by tests
    pub fn day(&self, day: Day) -> Vec<ExerciseRecord> {
        self.read(|week| week.day(day).to_vec())
    }

    /// Copy of the whole week
    #[allow(dead_code)] // Used by tests
    pub fn week(&self) -> WeekPlan {
        self.read(Clone::clone)
    }

    /// Rewrite the whole document
    pub fn save(&self) -> StoreResult<()> {
        let week = self.write_lock();
        self.persist(&week)
    }

    /// Append an exercise to `day` and persist.
    ///
    /// On a failed save the append is undone, so memory never runs ahead of
    /// disk.
    pub fn append(&self, day: Day, record: ExerciseRecord) -> StoreResult<()> {
        let mut week = self.write_lock();
        week.day_mut(day).push(record);

        if let Err(e) = self.persist(&week) {
            week.day_mut(day).pop();
            return Err(e);
        }

        tracing::info!(day = %day, count = week.day(day).len(), "Exercise appended");
        Ok(())
    }

    /// Log one set against the exercise at `index` on `day` and persist.
    /// Rolled back on a failed save, like [`ExerciseStore::append`].
    pub fn record_set(&self, day: Day, index: usize, reps: u32, weight: f64) -> StoreResult<()> {
        let mut week = self.write_lock();
        let record = week
            .day_mut(day)
            .get_mut(index)
            .ok_or(StoreError::ExerciseNotFound { day, index })?;
        record.log_set(reps, weight);

        if let Err(e) = self.persist(&week) {
            if let Some(record) = week.day_mut(day).get_mut(index) {
                record.sets_history.pop();
                record.weight_history.pop();
            }
            return Err(e);
        }

        Ok(())
    }

    /// Serialize and atomically replace the backing file. Caller holds the
    /// write lock.
    fn persist(&self, week: &WeekPlan) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(week)?;
        write_atomic(&self.inner.path, &json)?;
        self.inner.revision.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = %self.inner.path.display(), bytes = json.len(), "Exercise store saved");
        Ok(())
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, WeekPlan> {
        self.inner.week.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, WeekPlan> {
        self.inner.week.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write to a sibling temp file, then rename over the target
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
