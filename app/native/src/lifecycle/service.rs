//! Event loop driving the banner controller.
//!
//! The service owns a [`BannerController`] and multiplexes three sources:
//! host events sent through a [`BannerServiceHandle`], events emitted by
//! mounted banners, and the scheduler's next deadline. Everything runs on one
//! task, so registry mutations are serialized.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::controller::{BannerController, HostEvent};
use crate::config::{SettingsStore, watch_settings_file};
use crate::constants::service::CHANNEL_BUFFER_SIZE;
use crate::host::Host;
use crate::render::{BannerEvent, BannerRenderer};

/// Error types for service communication.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The service stopped or its queue is full.
    #[error("Failed to send event to banner service: channel closed or full")]
    SendFailed,
}

/// Handle for sending host events to a running service.
///
/// This handle is cheap to clone and can be shared across threads.
#[derive(Debug, Clone)]
pub struct BannerServiceHandle {
    sender: mpsc::Sender<HostEvent>,
}

impl BannerServiceHandle {
    const fn new(sender: mpsc::Sender<HostEvent>) -> Self { Self { sender } }

    /// Queues an event without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service stopped or the queue is full.
    pub fn send(&self, event: HostEvent) -> Result<(), ServiceError> {
        self.sender.try_send(event).map_err(|_| ServiceError::SendFailed)
    }

    /// Queues an event, waiting for room in the queue.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service stopped.
    pub async fn send_async(&self, event: HostEvent) -> Result<(), ServiceError> {
        self.sender.send(event).await.map_err(|_| ServiceError::SendFailed)
    }

    /// Asks the service to tear down every banner and stop.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SendFailed`] if the service already stopped.
    pub async fn shutdown(&self) -> Result<(), ServiceError> { self.send_async(HostEvent::Shutdown).await }

    /// Whether the service is still accepting events.
    #[must_use]
    pub fn is_alive(&self) -> bool { !self.sender.is_closed() }

    /// Reloads `settings` and refreshes every banner whenever its file changes.
    ///
    /// Does nothing when the store was not loaded from a file.
    pub fn watch_settings(&self, settings: &SettingsStore) {
        let Some(path) = settings.path().map(PathBuf::from) else {
            tracing::debug!("settings not backed by a file, not watching");
            return;
        };
        let handle = self.clone();
        let store = settings.clone();
        watch_settings_file(path, move || {
            if store.reload() && handle.send(HostEvent::SettingsSaved(None)).is_err() {
                tracing::warn!("banner service stopped, settings change dropped");
            }
        });
    }
}

/// Owns the controller and its event sources.
pub struct BannerService<H: Host, R: BannerRenderer> {
    controller: BannerController<H, R>,
    host_rx: mpsc::Receiver<HostEvent>,
    banner_rx: mpsc::UnboundedReceiver<BannerEvent>,
}

impl<H: Host, R: BannerRenderer> BannerService<H, R> {
    /// Creates a service and the handle that feeds it.
    #[must_use]
    pub fn new(host: H, renderer: R, settings: SettingsStore) -> (Self, BannerServiceHandle) {
        let (host_tx, host_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (banner_tx, banner_rx) = mpsc::unbounded_channel();
        let controller = BannerController::new(host, renderer, settings, banner_tx);
        (Self { controller, host_rx, banner_rx }, BannerServiceHandle::new(host_tx))
    }

    #[must_use]
    pub const fn controller(&self) -> &BannerController<H, R> { &self.controller }

    /// Runs until shutdown or until every handle is dropped.
    ///
    /// Every banner is destroyed before this returns. The controller is handed
    /// back for inspection.
    pub async fn run(mut self) -> BannerController<H, R> {
        tracing::debug!("banner service starting");

        loop {
            let deadline = self.controller.next_deadline();

            tokio::select! {
                biased;

                event = self.host_rx.recv() => match event {
                    None | Some(HostEvent::Shutdown) => break,
                    Some(event) => self.controller.handle_host_event(event, Instant::now()),
                },

                Some(event) = self.banner_rx.recv() => self.controller.handle_banner_event(event),

                () = sleep_until(deadline) => {
                    let resolved = self.controller.tick(Instant::now());
                    tracing::trace!(resolved, "scheduler tick");
                }
            }
        }

        self.controller.unload();
        tracing::debug!("banner service stopped");
        self.controller
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
