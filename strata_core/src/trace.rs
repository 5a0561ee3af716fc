// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured diagnostics for reconciliation and render-target lifecycles.
//!
//! This module provides a [`TraceSink`] trait with per-event methods. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Human-readable logging goes through `tracing` independently of this
//! module; sinks are for tooling (recording, export, assertions in tests).

use crate::error::HookError;
use crate::metrics::LayerMetrics;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a reconciliation pass ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassResult {
    /// Some surface was not attached yet; nothing was decided.
    Incomplete,
    /// Observed order matched the recorded order.
    NoDrift,
    /// Drift was found and the reattachment driver ran.
    Corrected,
}

/// A step in a render target's lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetPhase {
    /// Virtual display and presentation were allocated.
    Created,
    /// The host acknowledged the presentation is showing.
    Shown,
    /// A newer request arrived before the showing acknowledgment.
    Superseded,
    /// Content was swapped for a placeholder and handed back.
    Neutralized,
    /// The virtual display release was issued.
    Released,
    /// The host acknowledged the display removal.
    Removed,
    /// The caller stopped waiting for the removal acknowledgment.
    WaitCancelled,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the end of every reconciliation pass that inspected surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileEvent {
    /// Monotonic pass counter of the emitting reconciler.
    pub pass: u64,
    /// Number of surfaces observed this pass.
    pub surfaces: u32,
    /// Outcome.
    pub result: PassResult,
    /// Surfaces whose lifecycle was replayed.
    pub cycled: u32,
    /// Surfaces whose correction was skipped after a hook failure.
    pub skipped: u32,
}

/// Emitted when a lifecycle hook fails and the surface is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookFailureEvent {
    /// Pass counter.
    pub pass: u64,
    /// Position of the surface in the observed order.
    pub position: u32,
    /// The swallowed error.
    pub error: HookError,
}

/// Emitted on each render-target lifecycle step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetEvent {
    /// Generation of the target (increments per creation).
    pub generation: u64,
    /// Which step.
    pub phase: TargetPhase,
    /// Metrics the target was created with.
    pub metrics: LayerMetrics,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the end of a reconciliation pass.
    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        _ = e;
    }

    /// Called when a lifecycle hook failure is swallowed.
    fn on_hook_failure(&mut self, e: &HookFailureEvent) {
        _ = e;
    }

    /// Called on each render-target lifecycle step.
    fn on_target(&mut self, e: &TargetEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`ReconcileEvent`].
    #[inline]
    pub fn reconcile(&mut self, e: &ReconcileEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_reconcile(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HookFailureEvent`].
    #[inline]
    pub fn hook_failure(&mut self, e: &HookFailureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_hook_failure(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TargetEvent`].
    #[inline]
    pub fn target(&mut self, e: &TargetEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_target(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
