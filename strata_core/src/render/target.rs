// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One off-screen virtual display plus the presentation drawing into it.

use alloc::string::String;

use crate::ack::{AckWait, Acknowledgement};
use crate::host::{
    ContentSubtree, Presentation, PresentationContent, PresentationStyle, RenderHost,
    VirtualDisplay,
};
use crate::metrics::LayerMetrics;
use crate::trace::{TargetEvent, TargetPhase, Tracer};

struct Active<H: RenderHost> {
    surface: H::Surface,
    display: H::Display,
    presentation: H::Presentation,
    metrics: LayerMetrics,
    shown: Acknowledgement,
    removed: Acknowledgement,
    generation: u64,
}

#[derive(Clone, Debug)]
struct PendingRelease {
    removed: Acknowledgement,
    generation: u64,
    metrics: LayerMetrics,
}

/// Renders a caller-owned content subtree into a destination surface through
/// a virtual display.
///
/// The content subtree is owned by the target while no display is active
/// and moved into the presentation while one is. [`dispose`](Self::dispose)
/// moves it back out, so it can be taken with
/// [`take_content`](Self::take_content) and attached elsewhere.
///
/// At most one display is active per target, and a display is only bound
/// after the host has acknowledged removal of the previous one.
pub struct VirtualRenderTarget<H: RenderHost> {
    host: H,
    name: String,
    active: Option<Active<H>>,
    content: Option<H::Content>,
    pending_release: Option<PendingRelease>,
    generation: u64,
}

impl<H: RenderHost> core::fmt::Debug for VirtualRenderTarget<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualRenderTarget")
            .field("name", &self.name)
            .field("metrics", &self.metrics())
            .field("generation", &self.generation)
            .field("has_content", &self.content.is_some())
            .field("pending_release", &self.pending_release.is_some())
            .finish_non_exhaustive()
    }
}

impl<H: RenderHost> VirtualRenderTarget<H> {
    /// Creates an inactive target that will render `content`.
    pub fn new(host: H, name: impl Into<String>, content: H::Content) -> Self {
        Self {
            host,
            name: name.into(),
            active: None,
            content: Some(content),
            pending_release: None,
            generation: 0,
        }
    }

    /// Name given to the virtual displays this target creates.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The render host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether a display is currently bound.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a display is bound and its presentation has been
    /// acknowledged as showing.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.shown.is_resolved())
    }

    /// Metrics of the active display.
    #[must_use]
    pub fn metrics(&self) -> Option<LayerMetrics> {
        self.active.as_ref().map(|a| a.metrics)
    }

    /// Number of displays created so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a released display still awaits its removal acknowledgment.
    #[must_use]
    pub fn has_pending_release(&self) -> bool {
        self.pending_release
            .as_ref()
            .is_some_and(|p| !p.removed.is_resolved())
    }

    /// The content subtree, while no display holds it.
    #[must_use]
    pub fn content(&self) -> Option<&H::Content> {
        self.content.as_ref()
    }

    /// Takes the content subtree out of an inactive target.
    ///
    /// A later [`create`](Self::create) needs content again; see
    /// [`put_content`](Self::put_content).
    pub fn take_content(&mut self) -> Option<H::Content> {
        self.content.take()
    }

    /// Gives the target a content subtree to render.
    ///
    /// # Panics
    ///
    /// Panics if the target already holds content or a display is active.
    pub fn put_content(&mut self, content: H::Content) {
        assert!(
            self.active.is_none() && self.content.is_none(),
            "render target `{}` already has content",
            self.name
        );
        self.content = Some(content);
    }

    /// Returns a future resolving once the active presentation is showing,
    /// or `None` when no display is active.
    #[must_use]
    pub fn wait_shown(&self) -> Option<AckWait> {
        self.active.as_ref().map(|a| a.shown.wait())
    }

    /// Binds a new display to `surface` and shows the content on it.
    ///
    /// Waits first for the removal of a display released earlier whose
    /// acknowledgment is still outstanding. The target is not
    /// [ready](Self::is_ready) until the host acknowledges the presentation
    /// as showing.
    ///
    /// # Panics
    ///
    /// Panics if a display is already active or the content has been taken.
    pub async fn create(
        &mut self,
        surface: &H::Surface,
        metrics: LayerMetrics,
        tracer: &mut Tracer<'_>,
    ) {
        assert!(
            self.active.is_none(),
            "render target `{}` is already active; dispose it first",
            self.name
        );
        self.settle_release(tracer).await;
        self.bind(surface.clone(), metrics, tracer);
    }

    /// Replaces the active display with one sized for `metrics`, bound to
    /// the same surface.
    ///
    /// # Panics
    ///
    /// Panics if no display is active.
    pub async fn resize(&mut self, metrics: LayerMetrics, tracer: &mut Tracer<'_>) {
        let Some(active) = self.active.take() else {
            panic!("render target `{}` has no display to resize", self.name);
        };
        let surface = active.surface.clone();
        self.release(active, tracer);
        self.settle_release(tracer).await;
        self.bind(surface, metrics, tracer);
    }

    /// Tears the active display down.
    ///
    /// The content is swapped for a snapshot placeholder (or an empty root
    /// when it has nothing to draw) and handed back to the target, then the
    /// display is released and the host's removal acknowledgment awaited.
    ///
    /// Completes immediately when nothing is active and no earlier removal
    /// is outstanding. Dropping the future stops the waiting only: the
    /// release stays issued and the next [`create`](Self::create) waits for
    /// it.
    pub async fn dispose(&mut self, tracer: &mut Tracer<'_>) {
        if let Some(active) = self.active.take() {
            self.release(active, tracer);
        }
        self.settle_release(tracer).await;
    }

    pub(crate) fn emit(&self, phase: TargetPhase, tracer: &mut Tracer<'_>) {
        if let Some(active) = &self.active {
            tracer.target(&TargetEvent {
                generation: active.generation,
                phase,
                metrics: active.metrics,
            });
        }
    }

    fn bind(&mut self, surface: H::Surface, metrics: LayerMetrics, tracer: &mut Tracer<'_>) {
        let Some(content) = self.content.take() else {
            panic!("render target `{}` has no content to render", self.name);
        };
        self.generation += 1;
        let removed = Acknowledgement::new();
        let display =
            self.host
                .create_virtual_display(&self.name, &surface, metrics, removed.clone());
        let shown = Acknowledgement::new();
        let mut presentation =
            self.host
                .create_presentation(&display, PresentationStyle::OVERLAY, shown.clone());
        if presentation
            .set_content(PresentationContent::View(content))
            .is_some()
        {
            tracing::warn!(name = %self.name, "fresh presentation returned foreign content");
        }
        presentation.show();

        tracing::debug!(name = %self.name, generation = self.generation, ?metrics, "render target created");
        self.active = Some(Active {
            surface,
            display,
            presentation,
            metrics,
            shown,
            removed,
            generation: self.generation,
        });
        self.emit(TargetPhase::Created, tracer);
    }

    fn release(&mut self, mut active: Active<H>, tracer: &mut Tracer<'_>) {
        let mut event = TargetEvent {
            generation: active.generation,
            phase: TargetPhase::Neutralized,
            metrics: active.metrics,
        };

        let placeholder = match active
            .presentation
            .content()
            .and_then(ContentSubtree::capture)
        {
            Some(snapshot) => PresentationContent::Placeholder(snapshot),
            None => PresentationContent::Empty,
        };
        if let Some(content) = active.presentation.set_content(placeholder) {
            self.content = Some(content);
        }
        tracer.target(&event);

        // The removal acknowledgment is level-triggered, so holding it before
        // the release is enough to observe a synchronous removal.
        self.pending_release = Some(PendingRelease {
            removed: active.removed.clone(),
            generation: active.generation,
            metrics: active.metrics,
        });
        active.display.release();
        tracing::debug!(name = %self.name, generation = active.generation, "render target released");
        event.phase = TargetPhase::Released;
        tracer.target(&event);
    }

    async fn settle_release(&mut self, tracer: &mut Tracer<'_>) {
        let Some(pending) = self.pending_release.clone() else {
            return;
        };
        let mut guard = RemovalWait {
            tracer,
            event: TargetEvent {
                generation: pending.generation,
                phase: TargetPhase::Removed,
                metrics: pending.metrics,
            },
            armed: true,
        };
        pending.removed.wait().await;
        guard.finish();
        self.pending_release = None;
    }
}

/// Reports how a removal wait ended, including when it is dropped early.
struct RemovalWait<'t, 'a> {
    tracer: &'t mut Tracer<'a>,
    event: TargetEvent,
    armed: bool,
}

impl RemovalWait<'_, '_> {
    fn finish(&mut self) {
        self.armed = false;
        self.tracer.target(&self.event);
    }
}

impl Drop for RemovalWait<'_, '_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(generation = self.event.generation, "stopped waiting for display removal");
            self.event.phase = TargetPhase::WaitCancelled;
            self.tracer.target(&self.event);
        }
    }
}
