//! Copy-on-edit controller with polled dirty detection.
//!
//! The controller keeps the caller's `original` behind a shared lock, hands
//! out an independent editable copy and compares it against a baseline
//! snapshot on a fixed interval. The dirty flag is sticky: once the copy
//! diverges it stays set until the next commit or revert restarts tracking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::collaborators::{ValidationResult, Validator};
use crate::error::AppResult;

/// Persists an edited record and returns the canonical server copy.
#[async_trait::async_trait]
pub trait RecordStore<R>: Send + Sync {
    async fn persist(&self, record: &R) -> AppResult<R>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome<R> {
    Saved(R),
    Invalid(ValidationResult),
    NothingToSave,
}

type SavedCallback<R> = Box<dyn Fn(&R) + Send + Sync>;

pub struct EditController<R>
where
    R: Clone + PartialEq + Send + Sync + 'static,
{
    store: Arc<dyn RecordStore<R>>,
    validator: Arc<dyn Validator<R>>,
    poll_interval: Duration,
    on_save: Option<SavedCallback<R>>,
    tracking: Option<Tracking<R>>,
}

struct Tracking<R> {
    original: Arc<RwLock<R>>,
    editable: Arc<Mutex<R>>,
    baseline: Arc<R>,
    dirty: Arc<AtomicBool>,
    poller: Option<DirtyPoller>,
}

/// Background comparison task. Dropping it stops the task.
struct DirtyPoller {
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for DirtyPoller {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        self.task.abort();
    }
}

impl<R> EditController<R>
where
    R: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(
        store: Arc<dyn RecordStore<R>>,
        validator: Arc<dyn Validator<R>>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            validator,
            poll_interval,
            on_save: None,
            tracking: None,
        }
    }

    /// Registers a callback run after every successful save, once the
    /// canonical record has been committed.
    pub fn on_save(&mut self, callback: impl Fn(&R) + Send + Sync + 'static) {
        self.on_save = Some(Box::new(callback));
    }

    pub fn start_tracking(&mut self, original: Option<R>) {
        self.start_tracking_shared(original.map(|record| Arc::new(RwLock::new(record))));
    }

    /// Tracks a record the caller keeps a handle to; commits write through
    /// to it. `None` clears all tracking state.
    pub fn start_tracking_shared(&mut self, original: Option<Arc<RwLock<R>>>) {
        self.stop_tracking();
        let Some(original) = original else {
            if self.tracking.take().is_some() {
                tracing::debug!("edit tracking cleared");
            }
            return;
        };

        let snapshot = original
            .read()
            .expect("original record lock poisoned")
            .clone();
        let editable = Arc::new(Mutex::new(snapshot.clone()));
        let baseline = Arc::new(snapshot);
        let dirty = Arc::new(AtomicBool::new(false));
        let poller = spawn_poller(
            self.poll_interval,
            editable.clone(),
            baseline.clone(),
            dirty.clone(),
        );

        self.tracking = Some(Tracking {
            original,
            editable,
            baseline,
            dirty,
            poller,
        });
    }

    /// Stops the comparison timer. Records and the dirty flag are untouched.
    pub fn stop_tracking(&mut self) {
        if let Some(poller) = self.tracking.as_mut().and_then(|tracking| tracking.poller.take()) {
            drop(poller);
            tracing::debug!("dirty polling stopped");
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
            .as_ref()
            .is_some_and(|tracking| tracking.poller.is_some())
    }

    pub fn is_dirty(&self) -> bool {
        self.tracking
            .as_ref()
            .is_some_and(|tracking| tracking.dirty.load(Ordering::SeqCst))
    }

    /// Runs one comparison immediately instead of waiting for the timer.
    pub fn refresh_dirty(&self) -> bool {
        let Some(tracking) = self.tracking.as_ref() else {
            return false;
        };
        compare(&tracking.editable, &tracking.baseline, &tracking.dirty);
        tracking.dirty.load(Ordering::SeqCst)
    }

    pub fn editable(&self) -> Option<R> {
        let tracking = self.tracking.as_ref()?;
        Some(
            tracking
                .editable
                .lock()
                .expect("editable record lock poisoned")
                .clone(),
        )
    }

    /// Applies `change` to the editable copy. Returns `false` when nothing is
    /// being tracked.
    pub fn edit(&self, change: impl FnOnce(&mut R)) -> bool {
        let Some(tracking) = self.tracking.as_ref() else {
            return false;
        };
        let mut record = tracking
            .editable
            .lock()
            .expect("editable record lock poisoned");
        change(&mut *record);
        true
    }

    pub fn original(&self) -> Option<Arc<RwLock<R>>> {
        self.tracking
            .as_ref()
            .map(|tracking| tracking.original.clone())
    }

    pub fn validate(&self) -> ValidationResult {
        match self.editable() {
            Some(record) => self.validator.validate(&record),
            None => ValidationResult::default(),
        }
    }

    /// Validates, persists and commits the editable copy. Invalid input never
    /// reaches the store.
    pub async fn save(&mut self) -> AppResult<SaveOutcome<R>> {
        let Some(record) = self.editable() else {
            return Ok(SaveOutcome::NothingToSave);
        };

        let validation = self.validator.validate(&record);
        if !validation.is_valid() {
            tracing::debug!(errors = validation.errors.len(), "save aborted by validation");
            return Ok(SaveOutcome::Invalid(validation));
        }

        let canonical = self.store.persist(&record).await?;
        self.commit(canonical.clone());
        if let Some(callback) = self.on_save.as_ref() {
            callback(&canonical);
        }
        Ok(SaveOutcome::Saved(canonical))
    }

    /// Overwrites the shared original with `canonical` and restarts tracking
    /// from it.
    pub fn commit(&mut self, canonical: R) {
        self.stop_tracking();
        let original = match self.tracking.as_ref() {
            Some(tracking) => {
                *tracking
                    .original
                    .write()
                    .expect("original record lock poisoned") = canonical;
                tracking.original.clone()
            }
            None => Arc::new(RwLock::new(canonical)),
        };
        self.start_tracking_shared(Some(original));
    }

    /// Discards edits by restarting tracking from the untouched original.
    pub fn revert(&mut self) {
        let original = self.original();
        if original.is_some() {
            self.start_tracking_shared(original);
        }
    }
}

fn compare<R: PartialEq>(editable: &Mutex<R>, baseline: &R, dirty: &AtomicBool) {
    if dirty.load(Ordering::SeqCst) {
        return;
    }
    let diverged = *editable.lock().expect("editable record lock poisoned") != *baseline;
    if diverged {
        dirty.store(true, Ordering::SeqCst);
    }
}

fn spawn_poller<R>(
    poll_interval: Duration,
    editable: Arc<Mutex<R>>,
    baseline: Arc<R>,
    dirty: Arc<AtomicBool>,
) -> Option<DirtyPoller>
where
    R: PartialEq + Send + Sync + 'static,
{
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("no tokio runtime; dirty state only updates on refresh_dirty");
        return None;
    };

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let task = runtime.spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => compare(&editable, &baseline, &dirty),
            }
        }
    });
    tracing::debug!(interval_ms = poll_interval.as_millis() as u64, "dirty polling started");
    Some(DirtyPoller { shutdown_tx, task })
}
