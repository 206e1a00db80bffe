//! Settings file watcher for hot-reloading.
//!
//! This module watches the settings file and invokes a callback when it
//! changes, so the running service can reload and refresh every banner.

use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::constants::timing::SETTINGS_WATCH_DEBOUNCE_MS;

/// Trailing-edge debounce: fires once a full window passes with no new events.
#[derive(Debug)]
struct TrailingDebounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl TrailingDebounce {
    const fn new(window: Duration) -> Self { Self { window, deadline: None } }

    /// Records an event, pushing the deadline one window past `now`.
    fn touch(&mut self, now: Instant) { self.deadline = Some(now + self.window); }

    /// Time left before the pending deadline, `None` when idle.
    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns `true` once when the pending deadline has passed.
    fn fire(&mut self, now: Instant) -> bool {
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.deadline = None;
            return true;
        }
        false
    }
}

/// Starts watching the settings file for changes.
///
/// Spawns a background thread that owns the watcher. `on_change` runs on that
/// thread once the file has been quiet for the debounce window, so a burst of
/// writes reloads the final contents once.
///
/// # Arguments
///
/// * `settings_path` - The settings file to watch
/// * `on_change` - Invoked after the file was modified
pub fn watch_settings_file<F>(settings_path: PathBuf, on_change: F)
where F: Fn() + Send + 'static {
    let settings_filename =
        settings_path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();

    std::thread::spawn(move || {
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create settings watcher");
                return;
            }
        };

        // Watch the parent directory to catch file replacements
        // (some editors save by writing to a temp file then renaming)
        let watch_path = settings_path.parent().unwrap_or(&settings_path);

        if let Err(err) = watcher.watch(watch_path, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %err, path = %watch_path.display(), "failed to watch settings file");
            return;
        }

        let mut debounce = TrailingDebounce::new(Duration::from_millis(SETTINGS_WATCH_DEBOUNCE_MS));

        loop {
            let received = match debounce.remaining(Instant::now()) {
                Some(wait) => match rx.recv_timeout(wait) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match rx.recv() {
                    Ok(event) => Some(event),
                    // Channel closed, watcher dropped
                    Err(_) => break,
                },
            };

            match received {
                Some(Ok(event)) => {
                    let affects_settings = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some_and(|name| name == settings_filename));
                    if affects_settings {
                        debounce.touch(Instant::now());
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "settings watch error");
                }
                None => {}
            }

            if debounce.fire(Instant::now()) {
                tracing::debug!(path = %settings_path.display(), "settings file changed");
                on_change();
            }
        }
    });
}
