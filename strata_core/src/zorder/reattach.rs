// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forcing the host to re-derive surface order by replaying lifecycles.

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::host::{LifecycleHooks, OverlaySurface, Visibility, WindowTree};
use crate::trace::{HookFailureEvent, Tracer};

use super::{ReattachScope, Traversal};

/// What a replay did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReattachReport {
    /// Surfaces whose detach and attach hooks both ran.
    pub cycled: u32,
    /// Surfaces skipped because a hook failed.
    pub skipped: u32,
}

/// Replays detach/attach hooks on surfaces so the host re-derives their
/// draw order from the new attach order.
#[derive(Clone, Debug)]
pub struct ReattachmentDriver<K> {
    hooks: K,
    traversal: Traversal,
}

impl<K> ReattachmentDriver<K> {
    /// Creates a driver using `hooks`, replaying in `traversal` order.
    #[must_use]
    pub const fn new(hooks: K, traversal: Traversal) -> Self {
        Self { hooks, traversal }
    }

    /// Replay direction.
    #[must_use]
    pub const fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Returns the hook capability.
    #[must_use]
    pub const fn hooks(&self) -> &K {
        &self.hooks
    }

    /// Computes which positions of an observed order of length `len` to
    /// replay, in replay order.
    ///
    /// `stable` is the run reported by the tracker. It only matters for
    /// [`ReattachScope::Minimal`]: surfaces inside the run keep their place
    /// and everything else is replayed on top of (forward) or beneath
    /// (reversed) them.
    pub fn plan_into(&self, len: usize, stable: usize, scope: ReattachScope, out: &mut Vec<usize>) {
        out.clear();
        let stable = match scope {
            ReattachScope::All => 0,
            ReattachScope::Minimal => stable.min(len),
        };
        match self.traversal {
            Traversal::Forward => out.extend(stable..len),
            Traversal::Reversed => out.extend((0..len - stable).rev()),
        }
    }

    /// Replays the surfaces of `order` at `positions`, then requests a
    /// pre-draw pass.
    ///
    /// Each surface is hidden while its hooks run and gets its previous
    /// visibility back afterwards. A failing hook skips that surface only;
    /// when the detach hook fails the attach hook is not invoked.
    pub fn run<S, T>(
        &self,
        tree: &T,
        order: &[Rc<S>],
        positions: &[usize],
        pass: u64,
        tracer: &mut Tracer<'_>,
    ) -> ReattachReport
    where
        S: OverlaySurface,
        K: LifecycleHooks<S>,
        T: WindowTree<Surface = S>,
    {
        let mut report = ReattachReport::default();
        for &pos in positions {
            let surface = &*order[pos];
            let prior = surface.visibility();
            surface.set_visibility(Visibility::Gone);
            let replayed = self
                .hooks
                .detach(surface)
                .and_then(|()| self.hooks.attach(surface));
            surface.set_visibility(prior);

            match replayed {
                Ok(()) => report.cycled += 1,
                Err(error) => {
                    report.skipped += 1;
                    tracing::warn!(pass, position = pos, %error, "skipping z-order correction");
                    #[expect(
                        clippy::cast_possible_truncation,
                        reason = "surface positions are far below u32::MAX"
                    )]
                    tracer.hook_failure(&HookFailureEvent {
                        pass,
                        position: pos as u32,
                        error,
                    });
                }
            }
        }
        if !positions.is_empty() {
            tree.request_pre_draw();
        }
        report
    }
}
