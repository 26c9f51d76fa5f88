//! Periodic app rescan
//!
//! A background thread that rescans installed apps once per interval. The
//! interval is measured on the wall clock, so a device that slept through a
//! due rescan runs it shortly after waking. Failures are logged and the job
//! waits for the next interval; there are no retries.

use crate::config::LauncherConfig;
use crate::error::Result;
use crate::repository::AppRepository;
use crate::utils::now_millis;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest sleep between wall-clock checks
const MAX_TICK: Duration = Duration::from_secs(60);

/// Whether a rescan is due
///
/// `last_run_ms` is 0 when the job has never run.
pub fn should_run(last_run_ms: i64, now_ms: i64, interval: Duration) -> bool {
    if last_run_ms == 0 {
        return true;
    }
    let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(last_run_ms) >= interval_ms
}

/// Handle to the running rescan thread; stops it on drop
#[derive(Debug)]
pub struct AppUpdateJob {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    last_run: Arc<AtomicI64>,
}

impl AppUpdateJob {
    /// Start the job with the interval from `config`
    ///
    /// Returns `None` when `update_interval_hours` is 0.
    pub fn from_config(repository: AppRepository, config: &LauncherConfig) -> Result<Option<Self>> {
        if config.update_interval_hours == 0 {
            info!("Periodic app rescan disabled");
            return Ok(None);
        }
        let interval = Duration::from_secs(config.update_interval_hours.saturating_mul(3600));
        Self::spawn(repository, interval).map(Some)
    }

    /// Start rescanning every `interval`, first run one interval from now
    pub fn spawn(repository: AppRepository, interval: Duration) -> Result<Self> {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let last_run = Arc::new(AtomicI64::new(now_millis()));
        let job_last_run = Arc::clone(&last_run);
        let tick = interval.min(MAX_TICK);

        let handle = std::thread::Builder::new()
            .name("app-update-job".to_string())
            .spawn(move || {
                info!("App update job started, interval {:?}", interval);
                loop {
                    match stop_rx.recv_timeout(tick) {
                        Err(RecvTimeoutError::Timeout) => {
                            let now = now_millis();
                            if !should_run(job_last_run.load(Ordering::SeqCst), now, interval) {
                                continue;
                            }
                            job_last_run.store(now, Ordering::SeqCst);
                            match repository.refresh_installed_apps() {
                                Ok(count) => info!("Scheduled rescan found {} apps", count),
                                Err(e) => warn!("Scheduled rescan failed: {}", e),
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("App update job exited");
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
            last_run,
        })
    }

    /// Time of the last rescan attempt, milliseconds since the Unix epoch
    ///
    /// Before the first rescan this is the time the job was started.
    pub fn last_run_millis(&self) -> i64 {
        self.last_run.load(Ordering::SeqCst)
    }

    /// Whether the thread is still alive
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread and wait for it; a rescan in progress completes first
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("App update job panicked");
        }
    }
}

impl Drop for AppUpdateJob {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryCatalog;
    use crate::store::AppStore;
    use crate::test_utils::activity;
    use std::time::Instant;

    #[test]
    fn test_should_run_never_run() {
        assert!(should_run(0, 5, Duration::from_secs(3600)));
    }

    #[test]
    fn test_should_run_rate_limiting() {
        let hour = Duration::from_secs(3600);
        let now = now_millis();
        assert!(!should_run(now, now, hour));
        assert!(!should_run(now - 3_599_000, now, hour));
        assert!(should_run(now - 3_600_000, now, hour));
    }

    #[test]
    fn test_job_rescans_and_stops() {
        let catalog = Arc::new(MemoryCatalog::new());
        catalog.install(activity("com.a", "A"));
        let store = AppStore::open_in_memory().unwrap();
        let repository = AppRepository::new(store.clone(), catalog);

        let mut job = AppUpdateJob::spawn(repository, Duration::from_millis(20)).unwrap();
        let started = job.last_run_millis();
        assert!(started > 0);

        let deadline = Instant::now() + Duration::from_secs(5);
        while store.count().unwrap() == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(store.count().unwrap(), 1);
        assert!(job.last_run_millis() >= started + 20);

        assert!(job.is_running());
        job.stop();
        assert!(!job.is_running());
    }

    #[test]
    fn test_zero_interval_disables_job() {
        let catalog = Arc::new(MemoryCatalog::new());
        let repository = AppRepository::new(AppStore::open_in_memory().unwrap(), catalog);
        let config = LauncherConfig {
            update_interval_hours: 0,
            ..LauncherConfig::default()
        };
        assert!(AppUpdateJob::from_config(repository, &config).unwrap().is_none());
    }
}
