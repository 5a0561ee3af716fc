// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives a [`VirtualRenderTarget`] from destination-surface events.

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use futures_util::future::{Either, select};

use crate::ack::Acknowledgement;
use crate::error::ConfigError;
use crate::host::RenderHost;
use crate::lifecycle::{LifecycleEvent, LifecycleState, SurfaceLifecycle};
use crate::metrics::LayerMetrics;
use crate::trace::{TargetPhase, Tracer};

use super::VirtualRenderTarget;

/// Identifier of a content layout, resolved by the caller's inflater.
pub type LayoutId = u32;

/// Configuration for a [`RenderBridge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Name given to the virtual displays.
    pub name: String,
    /// Layout inflated into the content subtree. Required.
    pub content_layout: Option<LayoutId>,
}

impl BridgeConfig {
    /// Configuration without a content layout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_layout: None,
        }
    }

    /// Returns the configuration with `layout` as content.
    #[must_use]
    pub fn with_content_layout(self, layout: LayoutId) -> Self {
        Self {
            content_layout: Some(layout),
            ..self
        }
    }
}

struct BridgeInputs<S> {
    lifecycle: SurfaceLifecycle,
    surface: Option<S>,
    /// Bumped for every created surface.
    surface_epoch: u64,
    metrics: Option<LayerMetrics>,
    /// Resolved and replaced on every effective change.
    changed: Acknowledgement,
}

impl<S> Default for BridgeInputs<S> {
    fn default() -> Self {
        Self {
            lifecycle: SurfaceLifecycle::new(),
            surface: None,
            surface_epoch: 0,
            metrics: None,
            changed: Acknowledgement::new(),
        }
    }
}

/// Feeds host events into a running [`RenderBridge`].
///
/// Handles are cheap to clone. Every method only records the latest state
/// and wakes the bridge; nothing is rendered synchronously, so a burst of
/// events is coalesced into the last one.
pub struct BridgeHandle<S> {
    inputs: Rc<RefCell<BridgeInputs<S>>>,
}

impl<S> Clone for BridgeHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inputs: Rc::clone(&self.inputs),
        }
    }
}

impl<S> core::fmt::Debug for BridgeHandle<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inputs = self.inputs.borrow();
        f.debug_struct("BridgeHandle")
            .field("state", &inputs.lifecycle.state())
            .field("metrics", &inputs.metrics)
            .finish_non_exhaustive()
    }
}

impl<S> BridgeHandle<S> {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.inputs.borrow().lifecycle.state()
    }

    /// The container was attached to the window.
    pub fn attached(&self) {
        self.lifecycle(LifecycleEvent::Attached);
    }

    /// The container was detached from the window.
    pub fn detached(&self) {
        self.lifecycle(LifecycleEvent::Detached);
    }

    /// The destination surface was created.
    pub fn surface_created(&self, surface: S) {
        self.update(|inputs| {
            inputs.surface = Some(surface);
            inputs.surface_epoch += 1;
            inputs.lifecycle.handle(LifecycleEvent::SurfaceCreated);
            true
        });
    }

    /// The destination surface changed geometry.
    pub fn size_changed(&self, metrics: LayerMetrics) {
        self.update(|inputs| {
            let changed = inputs.metrics != Some(metrics);
            inputs.metrics = Some(metrics);
            changed
        });
    }

    /// The destination surface was destroyed. Its metrics are forgotten.
    pub fn surface_destroyed(&self) {
        self.update(|inputs| {
            inputs.surface = None;
            inputs.metrics = None;
            inputs.lifecycle.handle(LifecycleEvent::SurfaceDestroyed);
            true
        });
    }

    /// The display configuration changed.
    ///
    /// While resumed, the current metrics are re-emitted with the new
    /// density.
    pub fn configuration_changed(&self, density_dpi: u32) {
        self.update(|inputs| {
            if !inputs.lifecycle.is_resumed() {
                return false;
            }
            match inputs.metrics {
                Some(m) if m.density_dpi != density_dpi => {
                    inputs.metrics = Some(m.with_density(density_dpi));
                    true
                }
                _ => false,
            }
        });
    }

    /// Shuts the bridge down. The active target is disposed and
    /// [`RenderBridge::run`] returns.
    pub fn close(&self) {
        self.lifecycle(LifecycleEvent::Closed);
    }

    fn lifecycle(&self, event: LifecycleEvent) {
        self.update(|inputs| {
            let before = inputs.lifecycle.state();
            inputs.lifecycle.handle(event) != before
        });
    }

    fn update(&self, apply: impl FnOnce(&mut BridgeInputs<S>) -> bool) {
        let fired = {
            let mut inputs = self.inputs.borrow_mut();
            if !apply(&mut inputs) {
                return;
            }
            core::mem::take(&mut inputs.changed)
        };
        fired.resolve();
    }
}

/// What the bridge should converge to, read from the inputs at one instant.
struct Desired<S> {
    target: Option<(S, u64, LayerMetrics)>,
    closed: bool,
    changed: Acknowledgement,
}

/// Keeps exactly one render target in line with the destination surface.
///
/// [`run`](Self::run) is a single loop, so at most one create, resize or
/// dispose is in flight. After every step it re-reads the latest inputs:
/// a change arriving while the loop waits for a presentation to show
/// supersedes that wait, and intermediate metrics are never rendered.
/// Teardown of a target always completes before the next one is bound.
pub struct RenderBridge<H: RenderHost> {
    target: VirtualRenderTarget<H>,
    inputs: Rc<RefCell<BridgeInputs<H::Surface>>>,
    bound_epoch: u64,
}

impl<H: RenderHost> core::fmt::Debug for RenderBridge<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderBridge")
            .field("target", &self.target)
            .field("bound_epoch", &self.bound_epoch)
            .finish_non_exhaustive()
    }
}

impl<H: RenderHost> RenderBridge<H> {
    /// Creates a bridge, inflating the configured content layout with
    /// `inflate`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingContentLayout`] when `config` names no
    /// layout.
    pub fn new(
        host: H,
        config: BridgeConfig,
        inflate: impl FnOnce(LayoutId) -> H::Content,
    ) -> Result<Self, ConfigError> {
        let Some(layout) = config.content_layout else {
            return Err(ConfigError::MissingContentLayout { name: config.name });
        };
        let content = inflate(layout);
        Ok(Self {
            target: VirtualRenderTarget::new(host, config.name, content),
            inputs: Rc::new(RefCell::new(BridgeInputs::default())),
            bound_epoch: 0,
        })
    }

    /// A handle for delivering host events.
    #[must_use]
    pub fn handle(&self) -> BridgeHandle<H::Surface> {
        BridgeHandle {
            inputs: Rc::clone(&self.inputs),
        }
    }

    /// The render target.
    #[must_use]
    pub fn target(&self) -> &VirtualRenderTarget<H> {
        &self.target
    }

    /// Takes the content subtree back. Only succeeds while no target is
    /// active, e.g. after [`run`](Self::run) returned.
    pub fn take_content(&mut self) -> Option<H::Content> {
        self.target.take_content()
    }

    /// Runs until [`BridgeHandle::close`] is called.
    pub async fn run(&mut self, tracer: &mut Tracer<'_>) {
        loop {
            let desired = self.desired();
            match desired.target {
                Some((surface, epoch, metrics))
                    if self.target.is_active() || self.target.content().is_some() =>
                {
                    // Inputs are read again after every teardown, so a bind
                    // only ever uses the latest surface and metrics.
                    if self.is_stale(epoch, metrics) || self.target.has_pending_release() {
                        self.target.dispose(tracer).await;
                        continue;
                    }
                    if !self.target.is_active() {
                        self.target.create(&surface, metrics, tracer).await;
                        self.bound_epoch = epoch;
                    }
                    if let Some(shown) = self.target.wait_shown().filter(|_| !self.target.is_ready())
                    {
                        match select(shown, desired.changed.wait()).await {
                            Either::Left(_) => self.target.emit(TargetPhase::Shown, tracer),
                            Either::Right(_) => {
                                tracing::debug!(?metrics, "render target superseded before showing");
                                self.target.emit(TargetPhase::Superseded, tracer);
                                continue;
                            }
                        }
                    }
                }
                _ => self.target.dispose(tracer).await,
            }
            if desired.closed {
                tracing::debug!(name = self.target.name(), "render bridge closed");
                return;
            }
            desired.changed.wait().await;
        }
    }

    fn desired(&self) -> Desired<H::Surface> {
        let inputs = self.inputs.borrow();
        let target = match (&inputs.surface, inputs.metrics) {
            (Some(surface), Some(metrics))
                if inputs.lifecycle.is_resumed() && !metrics.is_empty() =>
            {
                Some((surface.clone(), inputs.surface_epoch, metrics))
            }
            _ => None,
        };
        Desired {
            target,
            closed: inputs.lifecycle.state() == LifecycleState::Destroyed,
            changed: inputs.changed.clone(),
        }
    }

    /// Whether the active target was bound to another surface or with other
    /// metrics.
    fn is_stale(&self, epoch: u64, metrics: LayerMetrics) -> bool {
        self.target
            .metrics()
            .is_some_and(|current| current != metrics || self.bound_epoch != epoch)
    }
}
