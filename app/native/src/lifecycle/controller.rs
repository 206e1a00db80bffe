//! Banner lifecycle controller.
//!
//! The controller owns the surface registry and the scheduler. Host events
//! schedule updates; [`BannerController::tick`] resolves the surfaces whose
//! delays elapsed and mounts or removes their banners. It is the only code
//! that mutates the registry.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use super::scheduler::{SurfaceScheduler, SurfaceState};
use crate::config::{BannerSettings, SettingsStore};
use crate::constants::timing::{EMBED_SETTLE_MS, PANE_DEBOUNCE_MS, PANE_SETTLE_MS};
use crate::host::{ContainerId, DocId, EmbedRequest, Host, NotePath, PaneId};
use crate::registry::{BannerInstance, SurfaceRegistry};
use crate::render::{
    BannerEvent, BannerEventKind, BannerProps, BannerRenderer, EventSink, SurfaceKey, SurfaceKind,
};
use crate::resolver::{
    BannerResolution, VerticalOffset, resolve_banner, resolve_display_props, resolve_header,
    resolve_image_url,
};

const PANE_DEBOUNCE: Duration = Duration::from_millis(PANE_DEBOUNCE_MS);
const PANE_SETTLE: Duration = Duration::from_millis(PANE_SETTLE_MS);
const EMBED_SETTLE: Duration = Duration::from_millis(EMBED_SETTLE_MS);

/// Notifications delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The workspace finished restoring its layout.
    LayoutReady,
    /// The active pane changed.
    PaneActivated(Option<PaneId>),
    /// A pane was closed.
    PaneClosed(PaneId),
    /// A note's metadata changed.
    MetadataChanged(NotePath),
    /// Panes were split, moved or switched view mode.
    LayoutChanged,
    /// Settings were saved. Carries the new settings when the sender has them.
    SettingsSaved(Option<BannerSettings>),
    /// Rendered content may need an embed or popover banner.
    Embed(EmbedRequest),
    /// Tear everything down and stop.
    Shutdown,
}

impl HostEvent {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LayoutReady => "layout-ready",
            Self::PaneActivated(_) => "pane-activated",
            Self::PaneClosed(_) => "pane-closed",
            Self::MetadataChanged(_) => "metadata-changed",
            Self::LayoutChanged => "layout-changed",
            Self::SettingsSaved(_) => "settings-saved",
            Self::Embed(_) => "embed",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Scheduled work for a surface.
#[derive(Debug, Clone)]
enum Job {
    Pane(PaneId),
    Embed(EmbedRequest),
}

/// Coordinates resolution, mounting and teardown of every banner.
pub struct BannerController<H: Host, R: BannerRenderer> {
    host: H,
    renderer: R,
    settings: SettingsStore,
    registry: SurfaceRegistry<R>,
    scheduler: SurfaceScheduler<Job>,
    events: UnboundedSender<BannerEvent>,
}

impl<H: Host, R: BannerRenderer> BannerController<H, R> {
    /// Creates a controller. Mounted banners report through `events`.
    #[must_use]
    pub fn new(host: H, renderer: R, settings: SettingsStore, events: UnboundedSender<BannerEvent>) -> Self {
        Self {
            host,
            renderer,
            settings,
            registry: SurfaceRegistry::new(),
            scheduler: SurfaceScheduler::new(),
            events,
        }
    }

    #[must_use]
    pub const fn host(&self) -> &H { &self.host }

    #[must_use]
    pub const fn renderer(&self) -> &R { &self.renderer }

    #[must_use]
    pub const fn registry(&self) -> &SurfaceRegistry<R> { &self.registry }

    #[must_use]
    pub const fn settings(&self) -> &SettingsStore { &self.settings }

    /// Scheduling state of a surface.
    #[must_use]
    pub fn surface_state(&self, key: &SurfaceKey) -> SurfaceState { self.scheduler.state(key) }

    /// Earliest moment [`BannerController::tick`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> { self.scheduler.next_deadline() }

    // ========================================================================
    // Host events
    // ========================================================================

    /// Dispatches a host event.
    pub fn handle_host_event(&mut self, event: HostEvent, now: Instant) {
        tracing::trace!(event = event.name(), "host event");
        match event {
            HostEvent::LayoutReady => self.refresh_all(now),
            HostEvent::PaneActivated(pane) => {
                if let Some(pane) = pane {
                    self.schedule_pane(pane, now, PANE_DEBOUNCE);
                }
            }
            HostEvent::PaneClosed(pane) => self.pane_closed(pane),
            HostEvent::MetadataChanged(note) => self.metadata_changed(&note, now),
            HostEvent::LayoutChanged => self.layout_changed(now),
            HostEvent::SettingsSaved(settings) => self.settings_saved(settings, now),
            HostEvent::Embed(request) => self.process_embed(request, now),
            HostEvent::Shutdown => self.unload(),
        }
    }

    /// Schedules every open pane showing `note`.
    pub fn metadata_changed(&mut self, note: &NotePath, now: Instant) {
        for pane in self.host.markdown_panes() {
            if self.host.pane_note(pane).as_ref() == Some(note) {
                self.schedule_pane(pane, now, PANE_DEBOUNCE);
            }
        }
    }

    /// Schedules the active pane.
    pub fn layout_changed(&mut self, now: Instant) {
        if let Some(pane) = self.host.active_pane()
            && self.host.pane_note(pane).is_some()
        {
            self.schedule_pane(pane, now, PANE_DEBOUNCE);
        }
    }

    /// Destroys a closed pane's banner and drops its pending update.
    pub fn pane_closed(&mut self, pane: PaneId) {
        self.registry.remove_pane(&mut self.renderer, pane);
        self.scheduler.cancel(&SurfaceKey::Pane(pane));
    }

    /// Applies new settings, if given, and refreshes every banner.
    pub fn settings_saved(&mut self, settings: Option<BannerSettings>, now: Instant) {
        if let Some(settings) = settings {
            self.settings.replace(settings);
        }
        self.refresh_all(now);
    }

    /// Schedules a banner for rendered embed or popover content.
    ///
    /// Content the host renders more than once is skipped when its container
    /// already carries a banner.
    pub fn process_embed(&mut self, request: EmbedRequest, now: Instant) {
        if self.renderer.is_banner_applied(request.container) {
            tracing::trace!(doc = %request.doc_id.0, "embed already has a banner");
            return;
        }
        let key = SurfaceKey::Embed(request.doc_id.clone());
        self.scheduler.schedule(key, Job::Embed(request), now, Duration::ZERO, EMBED_SETTLE);
    }

    fn schedule_pane(&mut self, pane: PaneId, now: Instant, debounce: Duration) {
        self.scheduler.schedule(SurfaceKey::Pane(pane), Job::Pane(pane), now, debounce, PANE_SETTLE);
    }

    // ========================================================================
    // Refresh and teardown
    // ========================================================================

    /// Destroys every banner, then schedules every open markdown pane.
    ///
    /// Panes skip the debounce and only wait for the settle delay.
    pub fn refresh_all(&mut self, now: Instant) {
        let destroyed = self.destroy_all();
        let panes = self.host.markdown_panes();
        tracing::debug!(destroyed, panes = panes.len(), "refreshing all banners");
        for pane in panes {
            self.schedule_pane(pane, now, Duration::ZERO);
        }
    }

    /// Destroys every live banner. Returns how many there were.
    ///
    /// Embed keys are forgotten entirely since their documents are not
    /// rendered again under the same id once torn down.
    pub fn destroy_all(&mut self) -> usize {
        let keys = self.registry.keys();
        let count = self.registry.remove_all(&mut self.renderer);
        for key in &keys {
            match key {
                SurfaceKey::Pane(_) => self.scheduler.mark_destroyed(key),
                SurfaceKey::Embed(_) => {
                    self.scheduler.cancel(key);
                }
            }
        }
        count
    }

    /// Destroys every banner and forgets every pending update.
    pub fn unload(&mut self) {
        let destroyed = self.destroy_all();
        self.scheduler.clear();
        tracing::debug!(destroyed, "banners unloaded");
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolves every surface whose delays elapsed. Returns how many were resolved.
    pub fn tick(&mut self, now: Instant) -> usize {
        let ready = self.scheduler.poll(now);
        let count = ready.len();
        for item in ready {
            if !self.scheduler.is_current(&item.key, item.generation) {
                continue;
            }
            let mounted = match item.payload {
                Job::Pane(pane) => self.resolve_pane(pane),
                Job::Embed(request) => self.resolve_embed(request),
            };
            let completed = self.scheduler.complete(&item.key, item.generation, mounted);
            if completed && !mounted && matches!(item.key, SurfaceKey::Embed(_)) {
                self.scheduler.cancel(&item.key);
            }
        }
        count
    }

    /// Rebuilds a pane's banner. Returns whether a banner ended up mounted.
    fn resolve_pane(&mut self, pane: PaneId) -> bool {
        self.registry.remove_pane(&mut self.renderer, pane);

        let Some(note) = self.host.pane_note(pane) else {
            return false;
        };
        let Some(container) = self.host.pane_container(pane) else {
            tracing::debug!(pane = pane.0, note = %note, "pane has no content container");
            return false;
        };

        let key = SurfaceKey::Pane(pane);
        match self.build(key, note, container, SurfaceKind::Pane) {
            Some(instance) => {
                self.registry.insert_pane(&mut self.renderer, pane, instance);
                true
            }
            None => false,
        }
    }

    /// Builds an embed or popover banner. Returns whether one ended up mounted.
    fn resolve_embed(&mut self, request: EmbedRequest) -> bool {
        let key = SurfaceKey::Embed(request.doc_id.clone());
        if self.renderer.is_banner_applied(request.container) {
            return self.registry.contains(&key);
        }

        let Some(kind) = self.classify_embed(&request) else {
            return self.registry.contains(&key);
        };

        let settings = self.settings.snapshot();
        let shown = match kind {
            SurfaceKind::Popover => settings.show_in_popovers,
            SurfaceKind::Embed | SurfaceKind::Pane => settings.show_in_embeds,
        };
        if !shown || !self.host.file_exists(request.source_path.as_str()) {
            return self.registry.contains(&key);
        }

        let EmbedRequest { doc_id, source_path, container, .. } = request;
        self.registry.remove_embed(&mut self.renderer, &doc_id);
        match self.build(key, source_path, container, kind) {
            Some(instance) => {
                self.registry.insert_embed(&mut self.renderer, doc_id, instance);
                true
            }
            None => false,
        }
    }

    /// Popover when rendered inside one; embed when the active pane shows a
    /// different note; otherwise not embedded content at all.
    fn classify_embed(&self, request: &EmbedRequest) -> Option<SurfaceKind> {
        if request.in_popover {
            return Some(SurfaceKind::Popover);
        }
        let active_note = self.host.active_pane().and_then(|pane| self.host.pane_note(pane))?;
        (active_note != request.source_path).then_some(SurfaceKind::Embed)
    }

    /// Resolves a note against a fresh settings snapshot and mounts its banner.
    fn build(
        &mut self,
        key: SurfaceKey,
        note: NotePath,
        container: ContainerId,
        kind: SurfaceKind,
    ) -> Option<BannerInstance<R>> {
        let settings = self.settings.snapshot();
        let frontmatter = self.host.frontmatter(&note);

        let BannerResolution::Resolved(banner) =
            resolve_banner(&note, &frontmatter, &settings, &self.host)
        else {
            tracing::trace!(note = %note, "no banner");
            return None;
        };

        let image = resolve_image_url(&banner, &self.host);
        let header = resolve_header(&note, &frontmatter, &settings);
        let display = resolve_display_props(&frontmatter, &settings, kind, self.host.is_mobile());
        let props = BannerProps::new(image, header, &display, kind);

        let wrapper = self.renderer.insert_wrapper(container, kind);
        match self.renderer.mount(&wrapper, props, EventSink::new(key, self.events.clone())) {
            Ok(handle) => {
                tracing::debug!(note = %note, path = %banner.path, ?kind, "banner mounted");
                Some(BannerInstance {
                    handle,
                    wrapper,
                    note,
                    position_property: display.position_property,
                    kind,
                })
            }
            Err(err) => {
                tracing::error!(note = %note, error = %err, "failed to mount banner");
                self.renderer.remove_wrapper(&wrapper);
                None
            }
        }
    }

    // ========================================================================
    // Banner events
    // ========================================================================

    /// Handles an event emitted by a mounted banner.
    ///
    /// Events from surfaces without a live banner are stale and ignored.
    pub fn handle_banner_event(&mut self, event: BannerEvent) {
        let Some(instance) = self.registry.get(&event.surface) else {
            tracing::trace!(surface = ?event.surface, "event from a destroyed banner");
            return;
        };

        match event.kind {
            BannerEventKind::LayoutChange { margin_bottom } => {
                self.renderer.set_margin_bottom(&instance.wrapper, &margin_bottom);
            }
            BannerEventKind::SavePosition { offset } => {
                if !instance.persists_position() {
                    return;
                }
                let note = instance.note.clone();
                let property = instance.position_property.clone();
                self.save_position(&note, &property, offset);
            }
        }
    }

    /// Writes a banner offset to the note. Failures are logged, never raised.
    fn save_position(&self, note: &NotePath, property: &str, offset: VerticalOffset) {
        let value = offset.to_string();
        let result = self.host.process_frontmatter(note, &mut |frontmatter| {
            frontmatter.insert(property, value.clone());
        });
        match result {
            Ok(()) => tracing::debug!(path = %note, property, value, "banner position saved"),
            Err(err) => tracing::error!(path = %note, error = %err, "failed to save banner position"),
        }
    }

    /// Embed banner for a document id, if one is live.
    #[must_use]
    pub fn embed_instance(&self, doc: &DocId) -> Option<&BannerInstance<R>> {
        self.registry.get(&SurfaceKey::Embed(doc.clone()))
    }
}
