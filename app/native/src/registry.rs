//! Live banner instances, one per surface.
//!
//! Panes and embeds are tracked in separate maps since they are keyed and
//! cleaned up differently: panes live as long as the workspace pane, embeds are
//! replaced every time their document id is rendered again.
//!
//! Inserting for a key that already holds an instance destroys the old one
//! first, so a surface never carries two banners.

use std::collections::HashMap;

use crate::host::{DocId, NotePath, PaneId};
use crate::render::{BannerRenderer, SurfaceKey, SurfaceKind};

/// A mounted banner: one component handle inside one wrapper.
pub struct BannerInstance<R: BannerRenderer> {
    pub handle: R::Handle,
    pub wrapper: R::Wrapper,
    /// Note the banner was resolved for.
    pub note: NotePath,
    /// Front-matter key that drags persist to.
    pub position_property: String,
    pub kind: SurfaceKind,
}

impl<R: BannerRenderer> BannerInstance<R> {
    /// Whether drags on this banner are saved back to the note.
    #[must_use]
    pub const fn persists_position(&self) -> bool { !self.kind.is_embedded() }

    fn destroy(self, renderer: &mut R) {
        renderer.unmount(self.handle);
        renderer.remove_wrapper(&self.wrapper);
    }
}

/// Pane and embed instance maps.
pub struct SurfaceRegistry<R: BannerRenderer> {
    panes: HashMap<PaneId, BannerInstance<R>>,
    embeds: HashMap<DocId, BannerInstance<R>>,
}

impl<R: BannerRenderer> Default for SurfaceRegistry<R> {
    fn default() -> Self { Self::new() }
}

impl<R: BannerRenderer> SurfaceRegistry<R> {
    #[must_use]
    pub fn new() -> Self { Self { panes: HashMap::new(), embeds: HashMap::new() } }

    /// Stores a pane instance, destroying any previous one for the pane.
    pub fn insert_pane(&mut self, renderer: &mut R, pane: PaneId, instance: BannerInstance<R>) {
        if let Some(prior) = self.panes.remove(&pane) {
            tracing::debug!(pane = pane.0, "replacing pane banner");
            prior.destroy(renderer);
        }
        self.panes.insert(pane, instance);
    }

    /// Stores an embed instance, destroying any previous one for the document id.
    pub fn insert_embed(&mut self, renderer: &mut R, doc: DocId, instance: BannerInstance<R>) {
        if let Some(prior) = self.embeds.remove(&doc) {
            tracing::debug!(doc = %doc.0, "replacing embed banner");
            prior.destroy(renderer);
        }
        self.embeds.insert(doc, instance);
    }

    /// Destroys the pane's instance. Returns `false` if there was none.
    pub fn remove_pane(&mut self, renderer: &mut R, pane: PaneId) -> bool {
        self.panes.remove(&pane).map(|instance| instance.destroy(renderer)).is_some()
    }

    /// Destroys the embed's instance. Returns `false` if there was none.
    pub fn remove_embed(&mut self, renderer: &mut R, doc: &DocId) -> bool {
        self.embeds.remove(doc).map(|instance| instance.destroy(renderer)).is_some()
    }

    /// Destroys the instance of any surface.
    pub fn remove(&mut self, renderer: &mut R, key: &SurfaceKey) -> bool {
        match key {
            SurfaceKey::Pane(pane) => self.remove_pane(renderer, *pane),
            SurfaceKey::Embed(doc) => self.remove_embed(renderer, doc),
        }
    }

    /// Destroys every instance. Returns how many were live.
    ///
    /// Every component is unmounted and every wrapper detached before this returns.
    pub fn remove_all(&mut self, renderer: &mut R) -> usize {
        let count = self.len();
        for (_, instance) in self.panes.drain() {
            instance.destroy(renderer);
        }
        for (_, instance) in self.embeds.drain() {
            instance.destroy(renderer);
        }
        count
    }

    /// Instance of any surface.
    #[must_use]
    pub fn get(&self, key: &SurfaceKey) -> Option<&BannerInstance<R>> {
        match key {
            SurfaceKey::Pane(pane) => self.panes.get(pane),
            SurfaceKey::Embed(doc) => self.embeds.get(doc),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &SurfaceKey) -> bool { self.get(key).is_some() }

    /// Keys of every live instance, panes first.
    #[must_use]
    pub fn keys(&self) -> Vec<SurfaceKey> {
        let mut panes: Vec<SurfaceKey> = self.panes.keys().copied().map(SurfaceKey::Pane).collect();
        let mut embeds: Vec<SurfaceKey> = self.embeds.keys().cloned().map(SurfaceKey::Embed).collect();
        panes.sort();
        embeds.sort();
        panes.append(&mut embeds);
        panes
    }

    #[must_use]
    pub fn pane_count(&self) -> usize { self.panes.len() }

    #[must_use]
    pub fn embed_count(&self) -> usize { self.embeds.len() }

    #[must_use]
    pub fn len(&self) -> usize { self.panes.len() + self.embeds.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.panes.is_empty() && self.embeds.is_empty() }
}
