// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory render host with explicit acknowledgment delivery.
//!
//! [`HeadlessRenderHost`] logs every operation as a [`HostOp`] and holds the
//! "showing" and "display removed" acknowledgments until the test delivers
//! them, which makes every interleaving of host callbacks reachable. A host
//! built with [`HeadlessRenderHost::immediate`] acknowledges synchronously
//! instead.
//!
//! Like a real compositor, the host faults when a second virtual display is
//! bound to a surface whose previous display has not been removed yet.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{Rect, Size};
use strata_core::ack::Acknowledgement;
use strata_core::host::{
    ContentFor, ContentSubtree, Presentation, PresentationContent, PresentationStyle, RenderHost,
    VirtualDisplay,
};
use strata_core::metrics::LayerMetrics;
use strata_core::render::LayoutId;

use crate::queue::AckQueue;
use crate::tree::SurfaceId;

/// Identity of a virtual display created by a [`HeadlessRenderHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayId(pub u32);

/// What a presentation's content root was set to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// The live content of a layout.
    View(LayoutId),
    /// A snapshot of a layout.
    Placeholder(LayoutId),
    /// Nothing.
    Empty,
}

/// One logged host operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOp {
    /// A virtual display was bound to a surface.
    CreateDisplay {
        /// New display.
        display: DisplayId,
        /// Destination surface.
        surface: SurfaceId,
        /// Requested geometry.
        metrics: LayerMetrics,
    },
    /// A presentation was created on a display.
    CreatePresentation {
        /// Display the presentation shows on.
        display: DisplayId,
        /// Requested style.
        style: PresentationStyle,
    },
    /// A presentation's content root was replaced.
    SetContent {
        /// Display the presentation shows on.
        display: DisplayId,
        /// New content.
        content: ContentKind,
    },
    /// A presentation was asked to show.
    Show {
        /// Display the presentation shows on.
        display: DisplayId,
    },
    /// The host confirmed a presentation is showing.
    Shown {
        /// Display the presentation shows on.
        display: DisplayId,
    },
    /// A display release was issued.
    Release {
        /// Released display.
        display: DisplayId,
    },
    /// The host confirmed a display is gone.
    Removed {
        /// Removed display.
        display: DisplayId,
    },
}

/// Content subtree inflated from a layout.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessContent {
    layout: LayoutId,
    bounds: Rect,
}

impl HeadlessContent {
    /// Size given to content by [`inflate`](Self::inflate).
    pub const DEFAULT_SIZE: Size = Size::new(320.0, 240.0);

    /// Content of `layout` laid out at `size`.
    #[must_use]
    pub fn new(layout: LayoutId, size: Size) -> Self {
        Self {
            layout,
            bounds: Rect::from_origin_size((0.0, 0.0), size),
        }
    }

    /// Inflates `layout` at [`DEFAULT_SIZE`](Self::DEFAULT_SIZE).
    #[must_use]
    pub fn inflate(layout: LayoutId) -> Self {
        Self::new(layout, Self::DEFAULT_SIZE)
    }

    /// Layout this content was inflated from.
    #[must_use]
    pub fn layout(&self) -> LayoutId {
        self.layout
    }

    /// Laid-out bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Lays the content out again at `size`.
    pub fn set_size(&mut self, size: Size) {
        self.bounds = self.bounds.with_size(size);
    }
}

/// Static image of a [`HeadlessContent`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentSnapshot {
    /// Layout the pixels came from.
    pub layout: LayoutId,
    /// Captured area.
    pub bounds: Rect,
}

impl ContentSubtree for HeadlessContent {
    type Snapshot = ContentSnapshot;

    fn capture(&self) -> Option<ContentSnapshot> {
        (!self.bounds.is_zero_area()).then_some(ContentSnapshot {
            layout: self.layout,
            bounds: self.bounds,
        })
    }
}

#[derive(Debug, Default)]
struct HostState {
    ops: Vec<HostOp>,
    /// Displays bound to each surface and not yet removed.
    bound: HashMap<SurfaceId, DisplayId>,
    shows: AckQueue<DisplayId>,
    removals: AckQueue<(SurfaceId, DisplayId)>,
    next_display: u32,
    immediate: bool,
}

impl HostState {
    fn log(&mut self, op: HostOp) {
        tracing::trace!(?op, "headless host");
        self.ops.push(op);
    }
}

/// Shared handle to an in-memory render host.
///
/// Clones refer to the same host.
#[derive(Clone, Debug, Default)]
pub struct HeadlessRenderHost {
    state: Rc<RefCell<HostState>>,
}

impl HeadlessRenderHost {
    /// A host that queues acknowledgments until delivered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that acknowledges every operation synchronously.
    #[must_use]
    pub fn immediate() -> Self {
        let host = Self::new();
        host.state.borrow_mut().immediate = true;
        host
    }

    /// Every operation so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> Vec<HostOp> {
        self.state.borrow().ops.clone()
    }

    /// Metrics of every display created so far.
    #[must_use]
    pub fn created_metrics(&self) -> Vec<LayerMetrics> {
        self.state
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                HostOp::CreateDisplay { metrics, .. } => Some(*metrics),
                _ => None,
            })
            .collect()
    }

    /// Number of displays bound and not yet removed.
    #[must_use]
    pub fn bound_displays(&self) -> usize {
        self.state.borrow().bound.len()
    }

    /// Acknowledgments waiting for delivery, as `(shown, removed)`.
    #[must_use]
    pub fn pending(&self) -> (usize, usize) {
        let state = self.state.borrow();
        (state.shows.len(), state.removals.len())
    }

    /// Confirms every presentation waiting to show. Returns how many.
    pub fn deliver_shown(&self) -> usize {
        let acks = {
            let mut state = self.state.borrow_mut();
            let acks = state.shows.drain();
            for (display, _) in &acks {
                state.log(HostOp::Shown { display: *display });
            }
            acks
        };
        let n = acks.len();
        for (_, ack) in acks {
            ack.resolve();
        }
        n
    }

    /// Confirms the oldest released display as removed.
    pub fn deliver_next_removal(&self) -> Option<DisplayId> {
        let (display, ack) = {
            let mut state = self.state.borrow_mut();
            let ((surface, display), ack) = state.removals.pop()?;
            state.bound.remove(&surface);
            state.log(HostOp::Removed { display });
            (display, ack)
        };
        ack.resolve();
        Some(display)
    }

    /// Confirms every released display as removed. Returns how many.
    pub fn deliver_removed(&self) -> usize {
        let mut n = 0;
        while self.deliver_next_removal().is_some() {
            n += 1;
        }
        n
    }

    /// Delivers every pending acknowledgment. Returns how many.
    pub fn flush(&self) -> usize {
        self.deliver_removed() + self.deliver_shown()
    }

    fn queue_show(&self, display: DisplayId, ack: Acknowledgement) {
        let immediate = {
            let mut state = self.state.borrow_mut();
            state.log(HostOp::Show { display });
            state.shows.push(display, ack);
            state.immediate
        };
        if immediate {
            self.deliver_shown();
        }
    }

    fn queue_removal(&self, surface: SurfaceId, display: DisplayId, ack: Acknowledgement) {
        let immediate = {
            let mut state = self.state.borrow_mut();
            state.log(HostOp::Release { display });
            state.removals.push((surface, display), ack);
            state.immediate
        };
        if immediate {
            self.deliver_removed();
        }
    }
}

/// Virtual display of a [`HeadlessRenderHost`].
#[derive(Debug)]
pub struct HeadlessDisplay {
    id: DisplayId,
    surface: SurfaceId,
    metrics: LayerMetrics,
    on_removed: Option<Acknowledgement>,
    host: HeadlessRenderHost,
}

impl HeadlessDisplay {
    /// Identity.
    #[must_use]
    pub fn id(&self) -> DisplayId {
        self.id
    }

    /// Geometry the display was created with.
    #[must_use]
    pub fn metrics(&self) -> LayerMetrics {
        self.metrics
    }
}

impl VirtualDisplay for HeadlessDisplay {
    fn release(&mut self) {
        if let Some(ack) = self.on_removed.take() {
            self.host.queue_removal(self.surface, self.id, ack);
        }
    }
}

/// Presentation window of a [`HeadlessRenderHost`].
#[derive(Debug)]
pub struct HeadlessPresentation {
    display: DisplayId,
    content: ContentFor<HeadlessContent>,
    showing: Cell<bool>,
    on_shown: Acknowledgement,
    host: HeadlessRenderHost,
}

impl Presentation for HeadlessPresentation {
    type Content = HeadlessContent;

    fn set_content(&mut self, content: ContentFor<HeadlessContent>) -> Option<HeadlessContent> {
        let kind = match &content {
            PresentationContent::View(c) => ContentKind::View(c.layout),
            PresentationContent::Placeholder(s) => ContentKind::Placeholder(s.layout),
            PresentationContent::Empty => ContentKind::Empty,
        };
        self.host.state.borrow_mut().log(HostOp::SetContent {
            display: self.display,
            content: kind,
        });
        match std::mem::replace(&mut self.content, content) {
            PresentationContent::View(previous) => Some(previous),
            PresentationContent::Placeholder(_) | PresentationContent::Empty => None,
        }
    }

    fn content(&self) -> Option<&HeadlessContent> {
        match &self.content {
            PresentationContent::View(c) => Some(c),
            PresentationContent::Placeholder(_) | PresentationContent::Empty => None,
        }
    }

    fn show(&mut self) {
        self.showing.set(true);
        self.host.queue_show(self.display, self.on_shown.clone());
    }

    fn is_showing(&self) -> bool {
        self.showing.get()
    }
}

impl RenderHost for HeadlessRenderHost {
    type Surface = SurfaceId;
    type Content = HeadlessContent;
    type Display = HeadlessDisplay;
    type Presentation = HeadlessPresentation;

    fn create_virtual_display(
        &self,
        name: &str,
        surface: &SurfaceId,
        metrics: LayerMetrics,
        on_removed: Acknowledgement,
    ) -> HeadlessDisplay {
        let mut state = self.state.borrow_mut();
        if let Some(existing) = state.bound.get(surface) {
            panic!(
                "virtual display `{name}` bound to {surface:?} while {existing:?} is not removed"
            );
        }
        let id = DisplayId(state.next_display);
        state.next_display += 1;
        state.bound.insert(*surface, id);
        state.log(HostOp::CreateDisplay {
            display: id,
            surface: *surface,
            metrics,
        });
        HeadlessDisplay {
            id,
            surface: *surface,
            metrics,
            on_removed: Some(on_removed),
            host: self.clone(),
        }
    }

    fn create_presentation(
        &self,
        display: &HeadlessDisplay,
        style: PresentationStyle,
        on_shown: Acknowledgement,
    ) -> HeadlessPresentation {
        self.state.borrow_mut().log(HostOp::CreatePresentation {
            display: display.id,
            style,
        });
        HeadlessPresentation {
            display: display.id,
            content: PresentationContent::Empty,
            showing: Cell::new(false),
            on_shown,
            host: self.clone(),
        }
    }
}
