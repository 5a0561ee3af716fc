// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order reconciliation for sibling overlay surfaces.
//!
//! Hosts that back views with hardware overlay surfaces often have no
//! "set surface index" primitive. Instead they derive the relative order of
//! sibling surfaces from the order in which the surfaces were attached to
//! the window. When views are reordered in the tree, the composited order
//! silently keeps the old attach order.
//!
//! Reconciliation fixes this after every layout:
//!
//! 1. [`SurfaceSetTracker`] compares the surfaces' layout order with the
//!    order recorded on the previous pass and reports drift.
//! 2. [`ReattachmentDriver`] replays the detach/attach lifecycle of the
//!    affected surfaces so the host re-derives their order, then schedules a
//!    pre-draw pass.
//! 3. [`ZOrderReconciler`] wires both into the container's attach/layout
//!    callbacks and stays out of the way when nested in another reconciling
//!    container.
//!
//! # Platform ordering quirk
//!
//! Before a platform version threshold, a surface attached *later* ends up
//! *below* earlier ones, so replay has to walk the desired order backwards.
//! [`ReconcilerConfig`] carries the threshold as data; [`Traversal`] is the
//! resulting direction.

mod reattach;
mod reconciler;
mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use reattach::{ReattachReport, ReattachmentDriver};
pub use reconciler::{ReconcileOutcome, ReconcilerState, ZOrderReconciler};
pub use tracker::{Observation, SurfaceSetTracker};

/// Platform version from which later-attached surfaces draw on top.
pub const DEFAULT_REVERSAL_THRESHOLD: u32 = 26;

/// Direction in which surfaces are replayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Bottom-most first; the last replayed surface ends up on top.
    Forward,
    /// Top-most first; the last replayed surface ends up at the bottom.
    Reversed,
}

/// Which surfaces a drifted pass replays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReattachScope {
    /// Every surface in the observed order.
    #[default]
    All,
    /// Only surfaces outside the run whose relative order is unchanged.
    Minimal,
}

/// Configuration for a [`ZOrderReconciler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Version of the running platform.
    pub platform_version: u32,
    /// First platform version where attach order maps directly to draw
    /// order. Older versions replay in reverse.
    pub reversal_threshold: u32,
    /// Which surfaces to replay on drift.
    pub scope: ReattachScope,
}

impl ReconcilerConfig {
    /// Configuration for `platform_version` with the default threshold and
    /// full replay.
    #[must_use]
    pub const fn new(platform_version: u32) -> Self {
        Self {
            platform_version,
            reversal_threshold: DEFAULT_REVERSAL_THRESHOLD,
            scope: ReattachScope::All,
        }
    }

    /// Configuration for a platform older than the default threshold.
    #[must_use]
    pub const fn legacy() -> Self {
        Self::new(DEFAULT_REVERSAL_THRESHOLD - 1)
    }

    /// Returns the same configuration with a different replay scope.
    #[must_use]
    pub const fn with_scope(self, scope: ReattachScope) -> Self {
        Self { scope, ..self }
    }

    /// Replay direction for this platform.
    #[must_use]
    pub const fn traversal(&self) -> Traversal {
        if self.platform_version < self.reversal_threshold {
            Traversal::Reversed
        } else {
            Traversal::Forward
        }
    }
}
