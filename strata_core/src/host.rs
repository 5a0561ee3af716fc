// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The core never talks to a windowing system directly. A platform adapter
//! implements the traits in this module and the core drives them:
//!
//! - **Window tree**: [`WindowTree`] exposes one container view: whether it
//!   is attached, the roles of its ancestors, its overlay surface
//!   descendants in draw order, and a hook to schedule a pre-draw pass.
//!
//! - **Overlay surfaces**: [`OverlaySurface`] is the host's hardware-backed
//!   view. The core only reads its attachment state and toggles its
//!   visibility; its draw index is owned by the host.
//!
//! - **Lifecycle hooks**: [`LifecycleHooks`] is the capability to replay a
//!   surface's detach/attach callbacks. It is best effort: hosts that cannot
//!   provide it return [`HookError::Unavailable`] (see [`NoopHooks`]).
//!
//! - **Render host**: [`RenderHost`] creates off-screen
//!   [`VirtualDisplay`]s bound to a destination surface and modal
//!   [`Presentation`] windows shown on them. Asynchronous confirmations are
//!   delivered by resolving the [`Acknowledgement`]s handed over at creation
//!   time.
//!
//! All methods take `&self`: hosts live on a single UI thread and use
//! interior mutability, so the core can hold a host handle across
//! suspension points while the host keeps delivering callbacks.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::ack::Acknowledgement;
use crate::error::{HookError, HookKind};
use crate::metrics::LayerMetrics;

/// Visibility of a view in the host tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Drawn and laid out.
    #[default]
    Visible,
    /// Laid out but not drawn.
    Invisible,
    /// Neither drawn nor laid out.
    Gone,
}

/// A hardware overlay surface owned by the host.
pub trait OverlaySurface {
    /// Whether the surface is currently attached to the host window.
    fn is_attached_to_window(&self) -> bool;

    /// Current visibility.
    fn visibility(&self) -> Visibility;

    /// Changes the visibility.
    fn set_visibility(&self, visibility: Visibility);
}

/// What an ancestor of a container is, as far as reconciliation cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Any ordinary view group.
    Plain,
    /// A container that runs its own z-order reconciler.
    ZOrderContainer,
}

/// The container view a reconciler is installed on.
pub trait WindowTree {
    /// Overlay surface type found among the container's descendants.
    type Surface: OverlaySurface;

    /// Whether the container is attached to the host window.
    fn is_attached_to_window(&self) -> bool;

    /// Roles of the container's ancestors, nearest first.
    fn ancestor_roles(&self) -> impl Iterator<Item = NodeRole> + '_;

    /// Appends the container's overlay surface descendants to `out`, in the
    /// order the host lays them out (bottom-most first).
    fn collect_surfaces(&self, out: &mut Vec<Rc<Self::Surface>>);

    /// Asks the host to run a pre-draw pass before the next frame.
    ///
    /// This must schedule, not re-enter layout synchronously.
    fn request_pre_draw(&self);
}

/// Capability to replay a surface's window lifecycle callbacks.
pub trait LifecycleHooks<S: ?Sized> {
    /// Invokes the surface's "detached from window" callback.
    fn detach(&self, surface: &S) -> Result<(), HookError>;

    /// Invokes the surface's "attached to window" callback.
    fn attach(&self, surface: &S) -> Result<(), HookError>;
}

impl<S: ?Sized, H: LifecycleHooks<S> + ?Sized> LifecycleHooks<S> for &H {
    fn detach(&self, surface: &S) -> Result<(), HookError> {
        (**self).detach(surface)
    }

    fn attach(&self, surface: &S) -> Result<(), HookError> {
        (**self).attach(surface)
    }
}

/// Hooks for hosts without lifecycle access. Every call reports
/// [`HookError::Unavailable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl<S: ?Sized> LifecycleHooks<S> for NoopHooks {
    fn detach(&self, _surface: &S) -> Result<(), HookError> {
        Err(HookError::Unavailable(HookKind::Detach))
    }

    fn attach(&self, _surface: &S) -> Result<(), HookError> {
        Err(HookError::Unavailable(HookKind::Attach))
    }
}

/// Window flags for a presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PresentationStyle {
    /// Whether the presentation may take input focus.
    pub focusable: bool,
    /// Whether the presentation may be dismissed by the user.
    pub cancelable: bool,
}

impl PresentationStyle {
    /// Non-focusable, non-cancelable: the style render targets use.
    pub const OVERLAY: Self = Self {
        focusable: false,
        cancelable: false,
    };
}

/// What a presentation's content root currently holds.
#[derive(Debug)]
pub enum PresentationContent<C, P> {
    /// The caller's content subtree.
    View(C),
    /// A static snapshot standing in for the content.
    Placeholder(P),
    /// Nothing.
    Empty,
}

/// Presentation content for a given content subtree type.
pub type ContentFor<C> = PresentationContent<C, <C as ContentSubtree>::Snapshot>;

/// The caller-owned view tree rendered into a render target.
pub trait ContentSubtree {
    /// Static image of the content.
    type Snapshot;

    /// Captures the current pixels, or `None` if there is nothing to draw.
    fn capture(&self) -> Option<Self::Snapshot>;
}

/// An off-screen display bound to a destination surface.
pub trait VirtualDisplay {
    /// Releases the display.
    ///
    /// Removal completes asynchronously; the host resolves the `on_removed`
    /// acknowledgment given to [`RenderHost::create_virtual_display`].
    fn release(&mut self);
}

/// A modal window shown on a virtual display.
pub trait Presentation {
    /// Content subtree type hosted by the presentation.
    type Content: ContentSubtree;

    /// Replaces the content root, returning the previous content subtree if
    /// the root held one.
    fn set_content(&mut self, content: ContentFor<Self::Content>) -> Option<Self::Content>;

    /// The content subtree currently attached, if the root holds one.
    fn content(&self) -> Option<&Self::Content>;

    /// Shows the window.
    ///
    /// The host resolves the `on_shown` acknowledgment given to
    /// [`RenderHost::create_presentation`] once the window is visible.
    fn show(&mut self);

    /// Whether the window is currently shown.
    fn is_showing(&self) -> bool;
}

/// Factory for virtual displays and presentations.
pub trait RenderHost {
    /// Destination surface handle.
    type Surface: Clone;
    /// Content subtree type.
    type Content: ContentSubtree;
    /// Virtual display type.
    type Display: VirtualDisplay;
    /// Presentation type.
    type Presentation: Presentation<Content = Self::Content>;

    /// Creates a virtual display rendering into `surface`.
    ///
    /// The host must resolve `on_removed` once the display has been fully
    /// torn down after [`VirtualDisplay::release`].
    fn create_virtual_display(
        &self,
        name: &str,
        surface: &Self::Surface,
        metrics: LayerMetrics,
        on_removed: Acknowledgement,
    ) -> Self::Display;

    /// Creates a presentation window on `display`.
    ///
    /// The host must resolve `on_shown` once the window is showing.
    fn create_presentation(
        &self,
        display: &Self::Display,
        style: PresentationStyle,
        on_shown: Acknowledgement,
    ) -> Self::Presentation;
}
