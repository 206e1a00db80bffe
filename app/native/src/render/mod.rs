//! Rendering contract.
//!
//! The banner component itself lives in the host UI. The engine hands it a
//! flat [`BannerProps`] bag and listens for the two [`BannerEvent`]s it emits.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::{BannerStyle, HeaderDecor, HorizontalAlign, VerticalAlign};
use crate::constants::markers;
use crate::host::{ContainerId, DocId, PaneId};
use crate::resolver::{DisplayProps, HeaderDescriptor, ImageOutcome, VerticalOffset};

/// Kind of surface a banner is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// A workspace pane.
    Pane,
    /// A transcluded embed.
    Embed,
    /// A hover popover.
    Popover,
}

impl SurfaceKind {
    /// Embeds and popovers are transient previews.
    #[must_use]
    pub const fn is_embedded(self) -> bool { matches!(self, Self::Embed | Self::Popover) }

    /// Classes of the wrapper element for this surface.
    #[must_use]
    pub const fn wrapper_classes(self) -> &'static [&'static str] {
        match self {
            Self::Pane => &[markers::WRAPPER_CLASS, markers::BANNER_APPLIED_CLASS],
            Self::Embed => {
                &[markers::WRAPPER_CLASS, markers::BANNER_APPLIED_CLASS, markers::EMBED_CLASS]
            }
            Self::Popover => {
                &[markers::WRAPPER_CLASS, markers::BANNER_APPLIED_CLASS, markers::POPOVER_CLASS]
            }
        }
    }
}

/// Identifies one rendering location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SurfaceKey {
    Pane(PaneId),
    Embed(DocId),
}

/// Props handed to the banner component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerProps {
    pub image_url: Option<String>,
    pub error_message: Option<String>,
    pub initial_y: VerticalOffset,
    pub height: String,
    pub style: BannerStyle,
    pub content_margin: f64,
    pub header_text: Option<String>,
    pub header_icon: Option<String>,
    pub header_h_align: HorizontalAlign,
    pub header_v_align: VerticalAlign,
    pub header_decor: HeaderDecor,
    pub header_title_size: String,
    pub header_icon_size: String,
    pub draggable: bool,
}

impl BannerProps {
    /// Assembles the prop bag from resolved parts.
    #[must_use]
    pub fn new(
        image: ImageOutcome,
        header: HeaderDescriptor,
        display: &DisplayProps,
        kind: SurfaceKind,
    ) -> Self {
        let (image_url, error_message) = match image {
            ImageOutcome::Ok { url } => (Some(url), None),
            ImageOutcome::Error { message } => (None, Some(message)),
        };
        Self {
            image_url,
            error_message,
            initial_y: display.initial_y,
            height: display.height.clone(),
            style: display.style,
            content_margin: display.content_margin,
            header_text: header.text,
            header_icon: header.icon,
            header_h_align: header.h_align,
            header_v_align: header.v_align,
            header_decor: header.decor,
            header_title_size: header.title_size,
            header_icon_size: header.icon_size,
            draggable: !kind.is_embedded(),
        }
    }
}

/// Payload of a component event.
#[derive(Debug, Clone, PartialEq)]
pub enum BannerEventKind {
    /// The component wants the wrapper's bottom margin set (CSS length).
    LayoutChange { margin_bottom: String },
    /// The user dragged the image to a new vertical offset.
    SavePosition { offset: VerticalOffset },
}

/// An event emitted by a mounted banner.
#[derive(Debug, Clone, PartialEq)]
pub struct BannerEvent {
    pub surface: SurfaceKey,
    pub kind: BannerEventKind,
}

/// Sending half handed to a mounted component, tagged with its surface.
#[derive(Debug, Clone)]
pub struct EventSink {
    surface: SurfaceKey,
    tx: UnboundedSender<BannerEvent>,
}

impl EventSink {
    /// Creates a sink for one surface.
    #[must_use]
    pub const fn new(surface: SurfaceKey, tx: UnboundedSender<BannerEvent>) -> Self {
        Self { surface, tx }
    }

    /// Surface this sink reports for.
    #[must_use]
    pub const fn surface(&self) -> &SurfaceKey { &self.surface }

    /// Reports a layout change.
    pub fn layout_change(&self, margin_bottom: impl Into<String>) {
        self.emit(BannerEventKind::LayoutChange { margin_bottom: margin_bottom.into() });
    }

    /// Reports a drag to a new offset.
    pub fn save_position(&self, offset: VerticalOffset) {
        self.emit(BannerEventKind::SavePosition { offset });
    }

    fn emit(&self, kind: BannerEventKind) {
        let event = BannerEvent { surface: self.surface.clone(), kind };
        if self.tx.send(event).is_err() {
            tracing::debug!(surface = ?self.surface, "banner event dropped, service stopped");
        }
    }
}

/// The component failed to initialize.
#[derive(Debug, Error)]
#[error("Failed to mount banner: {0}")]
pub struct MountError(pub String);

/// Host UI operations needed to place banner components.
pub trait BannerRenderer {
    /// Wrapper element inserted into a container.
    type Wrapper: Clone;
    /// Handle to a mounted component.
    type Handle;

    /// Whether the container, or its enclosing embed or popover root, already
    /// holds a banner wrapper.
    fn is_banner_applied(&self, container: ContainerId) -> bool;

    /// Inserts a fresh wrapper carrying [`SurfaceKind::wrapper_classes`].
    ///
    /// Panes prepend it inside the container; embeds and popovers insert it
    /// before the container.
    fn insert_wrapper(&mut self, container: ContainerId, kind: SurfaceKind) -> Self::Wrapper;

    /// Mounts the component into a wrapper.
    ///
    /// # Errors
    ///
    /// Returns an error if the component fails to initialize.
    fn mount(
        &mut self,
        wrapper: &Self::Wrapper,
        props: BannerProps,
        events: EventSink,
    ) -> Result<Self::Handle, MountError>;

    /// Unmounts a component. Completion may be deferred by the host.
    fn unmount(&mut self, handle: Self::Handle);

    /// Detaches a wrapper from the document.
    fn remove_wrapper(&mut self, wrapper: &Self::Wrapper);

    /// Applies a bottom margin to a wrapper.
    fn set_margin_bottom(&mut self, wrapper: &Self::Wrapper, margin: &str);
}
