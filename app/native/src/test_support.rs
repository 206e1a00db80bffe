//! In-memory host and renderer used by unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::frontmatter::Frontmatter;
use crate::host::{
    ContainerId, FrontmatterWriter, HostError, MetadataSource, NotePath, PaneId, Workspace,
};
use crate::render::{BannerProps, BannerRenderer, EventSink, MountError, SurfaceKind};

// ============================================================================
// Host
// ============================================================================

#[derive(Debug, Clone)]
struct PaneState {
    note: Option<NotePath>,
    container: Option<ContainerId>,
}

#[derive(Debug, Default)]
struct HostState {
    notes: BTreeMap<NotePath, Frontmatter>,
    files: BTreeSet<String>,
    panes: BTreeMap<PaneId, PaneState>,
    active: Option<PaneId>,
    mobile: bool,
    reject_writes: bool,
    writes: Vec<NotePath>,
}

/// Host with notes, files and panes held in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl MemoryHost {
    pub fn new() -> Self { Self::default() }

    /// Registers a plain file (an image, usually).
    pub fn add_file(&self, path: &str) { self.state.lock().files.insert(NotePath::new(path).to_string()); }

    /// Registers a note with YAML front matter.
    pub fn add_note(&self, path: &str, yaml: &str) {
        let frontmatter = if yaml.trim().is_empty() {
            Frontmatter::new()
        } else {
            Frontmatter::from_yaml(serde_yaml::from_str(yaml).unwrap())
        };
        let note = NotePath::new(path);
        let mut state = self.state.lock();
        state.files.insert(note.to_string());
        state.notes.insert(note, frontmatter);
    }

    pub fn frontmatter_of(&self, path: &str) -> Frontmatter {
        self.state.lock().notes.get(&NotePath::new(path)).cloned().unwrap_or_default()
    }

    /// Opens a pane on a note; the pane's container id equals its pane id.
    pub fn open_pane(&self, pane: u64, note: &str) {
        self.state.lock().panes.insert(
            PaneId(pane),
            PaneState { note: Some(NotePath::new(note)), container: Some(ContainerId(pane)) },
        );
    }

    pub fn close_pane(&self, pane: u64) {
        let mut state = self.state.lock();
        state.panes.remove(&PaneId(pane));
        if state.active == Some(PaneId(pane)) {
            state.active = None;
        }
    }

    pub fn set_pane_container(&self, pane: u64, container: Option<ContainerId>) {
        if let Some(state) = self.state.lock().panes.get_mut(&PaneId(pane)) {
            state.container = container;
        }
    }

    pub fn set_active(&self, pane: Option<u64>) { self.state.lock().active = pane.map(PaneId); }

    pub fn set_mobile(&self, mobile: bool) { self.state.lock().mobile = mobile; }

    pub fn reject_writes(&self, reject: bool) { self.state.lock().reject_writes = reject; }

    /// Notes written through [`FrontmatterWriter`], in order.
    pub fn writes(&self) -> Vec<NotePath> { self.state.lock().writes.clone() }
}

impl MetadataSource for MemoryHost {
    fn frontmatter(&self, note: &NotePath) -> Frontmatter {
        self.state.lock().notes.get(note).cloned().unwrap_or_default()
    }

    fn resolve_link(&self, link: &str, _source: &NotePath) -> Option<NotePath> {
        let link = NotePath::new(link.trim());
        let state = self.state.lock();
        if state.files.contains(link.as_str()) {
            return Some(link);
        }
        let suffix = format!("/{link}");
        state
            .files
            .iter()
            .filter(|f| f.ends_with(&suffix))
            .min_by_key(|f| f.len())
            .map(|f| NotePath::new(f.as_str()))
    }

    fn file_exists(&self, path: &str) -> bool { self.state.lock().files.contains(path) }

    fn resource_url(&self, path: &str) -> String { format!("app://vault/{path}") }
}

impl FrontmatterWriter for MemoryHost {
    fn process_frontmatter(
        &self,
        note: &NotePath,
        mutate: &mut dyn FnMut(&mut Frontmatter),
    ) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if state.reject_writes {
            return Err(HostError::Rejected { path: note.to_string(), reason: "read-only".to_string() });
        }
        let Some(frontmatter) = state.notes.get_mut(note) else {
            return Err(HostError::NoteNotFound(note.to_string()));
        };
        mutate(frontmatter);
        state.writes.push(note.clone());
        Ok(())
    }
}

impl Workspace for MemoryHost {
    fn markdown_panes(&self) -> Vec<PaneId> {
        self.state.lock().panes.iter().filter(|(_, p)| p.note.is_some()).map(|(id, _)| *id).collect()
    }

    fn pane_note(&self, pane: PaneId) -> Option<NotePath> {
        self.state.lock().panes.get(&pane).and_then(|p| p.note.clone())
    }

    fn active_pane(&self) -> Option<PaneId> { self.state.lock().active }

    fn pane_container(&self, pane: PaneId) -> Option<ContainerId> {
        self.state.lock().panes.get(&pane).and_then(|p| p.container)
    }

    fn is_mobile(&self) -> bool { self.state.lock().mobile }
}

// ============================================================================
// Renderer
// ============================================================================

#[derive(Debug, Clone)]
pub struct WrapperRecord {
    pub container: ContainerId,
    pub kind: SurfaceKind,
    pub margin_bottom: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MountRecord {
    pub wrapper: u64,
    pub props: BannerProps,
    pub events: EventSink,
}

#[derive(Debug, Default)]
struct RenderState {
    next_id: u64,
    wrappers: BTreeMap<u64, WrapperRecord>,
    mounts: BTreeMap<u64, MountRecord>,
    applied: BTreeSet<ContainerId>,
    reject_mounts: bool,
    total_mounts: usize,
}

/// Renderer that records wrappers and mounts. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    state: Arc<Mutex<RenderState>>,
}

impl RecordingRenderer {
    pub fn new() -> Self { Self::default() }

    /// Marks a container as already decorated by someone else.
    pub fn mark_applied(&self, container: ContainerId) { self.state.lock().applied.insert(container); }

    pub fn reject_mounts(&self, reject: bool) { self.state.lock().reject_mounts = reject; }

    /// Wrappers currently attached.
    pub fn wrapper_count(&self) -> usize { self.state.lock().wrappers.len() }

    /// Components currently mounted.
    pub fn mount_count(&self) -> usize { self.state.lock().mounts.len() }

    /// Components mounted since creation.
    pub fn total_mounts(&self) -> usize { self.state.lock().total_mounts }

    fn mount_in(&self, container: ContainerId) -> Option<MountRecord> {
        let state = self.state.lock();
        state
            .mounts
            .values()
            .find(|m| state.wrappers.get(&m.wrapper).is_some_and(|w| w.container == container))
            .cloned()
    }

    /// Props of the component mounted in a container.
    pub fn props_in(&self, container: ContainerId) -> Option<BannerProps> {
        self.mount_in(container).map(|m| m.props)
    }

    /// Event sink of the component mounted in a container.
    pub fn events_in(&self, container: ContainerId) -> Option<EventSink> {
        self.mount_in(container).map(|m| m.events)
    }

    /// Wrapper attached to a container.
    pub fn wrapper_in(&self, container: ContainerId) -> Option<WrapperRecord> {
        self.state.lock().wrappers.values().find(|w| w.container == container).cloned()
    }
}

impl BannerRenderer for RecordingRenderer {
    type Handle = u64;
    type Wrapper = u64;

    fn is_banner_applied(&self, container: ContainerId) -> bool {
        let state = self.state.lock();
        state.applied.contains(&container) || state.wrappers.values().any(|w| w.container == container)
    }

    fn insert_wrapper(&mut self, container: ContainerId, kind: SurfaceKind) -> u64 {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.wrappers.insert(id, WrapperRecord { container, kind, margin_bottom: None });
        id
    }

    fn mount(&mut self, wrapper: &u64, props: BannerProps, events: EventSink) -> Result<u64, MountError> {
        let mut state = self.state.lock();
        if state.reject_mounts {
            return Err(MountError("component refused to start".to_string()));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.mounts.insert(id, MountRecord { wrapper: *wrapper, props, events });
        state.total_mounts += 1;
        Ok(id)
    }

    fn unmount(&mut self, handle: u64) { self.state.lock().mounts.remove(&handle); }

    fn remove_wrapper(&mut self, wrapper: &u64) { self.state.lock().wrappers.remove(wrapper); }

    fn set_margin_bottom(&mut self, wrapper: &u64, margin: &str) {
        if let Some(record) = self.state.lock().wrappers.get_mut(wrapper) {
            record.margin_bottom = Some(margin.to_string());
        }
    }
}
