//! Debounced write-back of the medical state.
//!
//! [`AutoSave`] listens to the store's change events. Each event (re)starts a quiet-period
//! timer; when the timer runs out without a new event, the *current* state is read and written
//! through the [`StateRepository`]. A burst of N mutations inside one window therefore produces
//! exactly one write, and that write reflects the last mutation.
//!
//! The reactor is an explicit task. [`AutoSave::shutdown`] stops it and flushes any change that
//! has not been written yet, so a graceful exit loses nothing. Write failures are logged and
//! counted; the reactor keeps running and retries on the next change.

use crate::storage::StateRepository;
use crate::store::StoreHandle;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Counters reported when the reactor stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveStats {
    pub writes: u64,
    pub failures: u64,
}

#[derive(Debug)]
pub struct AutoSave {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<AutoSaveStats>,
}

impl AutoSave {
    /// Starts the reactor. Changes made after this call returns are always observed.
    pub fn spawn(handle: StoreHandle, repo: StateRepository, debounce: Duration) -> Self {
        let (events, saved_revision) = {
            let store = handle.read();
            (store.subscribe(), store.revision())
        };
        let (stop, stop_rx) = oneshot::channel();

        tracing::info!("auto-save started (debounce {:?})", debounce);
        let reactor = Reactor {
            handle,
            repo,
            saved_revision,
            stats: AutoSaveStats::default(),
        };
        let task = tokio::spawn(reactor.run(events, stop_rx, debounce));

        Self {
            stop: Some(stop),
            task,
        }
    }

    /// Stops the reactor, writing any change that is still pending.
    pub async fn shutdown(mut self) -> AutoSaveStats {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match (&mut self.task).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!("auto-save task failed: {}", e);
                AutoSaveStats::default()
            }
        }
    }
}

struct Reactor {
    handle: StoreHandle,
    repo: StateRepository,
    saved_revision: u64,
    stats: AutoSaveStats,
}

impl Reactor {
    async fn run(
        mut self,
        mut events: tokio::sync::broadcast::Receiver<crate::store::StoreEvent>,
        mut stop: oneshot::Receiver<()>,
        debounce: Duration,
    ) -> AutoSaveStats {
        let timer = tokio::time::sleep(debounce);
        tokio::pin!(timer);
        let mut pending = false;

        loop {
            tokio::select! {
                biased;
                // A dropped `AutoSave` also ends the reactor.
                _ = &mut stop => break,
                event = events.recv() => match event {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        pending = true;
                        timer.as_mut().reset(Instant::now() + debounce);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut timer, if pending => {
                    pending = false;
                    self.save();
                }
            }
        }

        self.flush();
        tracing::info!(
            "auto-save stopped ({} writes, {} failures)",
            self.stats.writes,
            self.stats.failures
        );
        self.stats
    }

    fn flush(&mut self) {
        if self.handle.read().revision() != self.saved_revision {
            self.save();
        }
    }

    fn save(&mut self) {
        let (state, revision) = {
            let store = self.handle.read();
            (store.snapshot(), store.revision())
        };
        match self.repo.save(&state) {
            Ok(bytes) => {
                self.saved_revision = revision;
                self.stats.writes += 1;
                tracing::debug!("auto-saved revision {} ({} bytes)", revision, bytes);
            }
            Err(e) => {
                self.stats.failures += 1;
                tracing::error!("auto-save failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BedDraft;
    use crate::seed::seed_state;
    use crate::storage::{KeyValueStore, MemoryKeyValueStore};
    use crate::store::MedicalStore;
    use hms_types::NonEmptyText;
    use std::sync::Arc;

    const DEBOUNCE: Duration = Duration::from_millis(1000);

    fn setup(kv: Arc<MemoryKeyValueStore>) -> (StoreHandle, StateRepository) {
        let repo = StateRepository::new(kv, NonEmptyText::new("medical_data").unwrap());
        let handle = StoreHandle::new(MedicalStore::new(seed_state()));
        (handle, repo)
    }

    fn add_bed(handle: &StoreHandle, number: &str) {
        handle
            .write()
            .add_bed(BedDraft {
                number: number.into(),
                ..Default::default()
            })
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_mutations_produces_one_write_of_latest_state() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let (handle, repo) = setup(kv.clone());
        let autosave = AutoSave::spawn(handle.clone(), repo.clone(), DEBOUNCE);

        for i in 0..5 {
            add_bed(&handle, &format!("40{i}"));
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        assert_eq!(kv.write_count(), 0, "timer restarts on every change");

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(kv.write_count(), 1);
        assert_eq!(repo.load().unwrap().state.beds.len(), 10);

        let stats = autosave.shutdown().await;
        assert_eq!(stats, AutoSaveStats { writes: 1, failures: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_write_without_changes() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let (handle, repo) = setup(kv.clone());
        let autosave = AutoSave::spawn(handle, repo, DEBOUNCE);

        tokio::time::sleep(Duration::from_secs(10)).await;
        autosave.shutdown().await;

        assert_eq!(kv.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_change() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let (handle, repo) = setup(kv.clone());
        let autosave = AutoSave::spawn(handle.clone(), repo.clone(), DEBOUNCE);

        add_bed(&handle, "501");
        let stats = autosave.shutdown().await;

        assert_eq!(stats.writes, 1);
        assert_eq!(kv.write_count(), 1);
        assert_eq!(repo.load().unwrap().state.beds.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_write_separately() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let (handle, repo) = setup(kv.clone());
        let autosave = AutoSave::spawn(handle.clone(), repo, DEBOUNCE);

        add_bed(&handle, "601");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        add_bed(&handle, "602");
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(kv.write_count(), 2);
        assert_eq!(autosave.shutdown().await.writes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_is_counted_and_reactor_keeps_running() {
        let kv = Arc::new(MemoryKeyValueStore::new().with_quota(Some(16)));
        let (handle, repo) = setup(kv.clone());
        let autosave = AutoSave::spawn(handle.clone(), repo, DEBOUNCE);

        add_bed(&handle, "701");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        add_bed(&handle, "702");
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let stats = autosave.shutdown().await;
        // Two debounced attempts, plus the flush of the still-unsaved revision.
        assert_eq!(stats, AutoSaveStats { writes: 0, failures: 3 });
        assert_eq!(kv.get_item("medical_data").unwrap(), None);
    }
}
