// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drift detection between observed and recorded surface order.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;

use crate::host::{OverlaySurface, WindowTree};

use super::Traversal;

/// Result of [`SurfaceSetTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// At least one surface is not attached to the window yet.
    Incomplete,
    /// The observed order matches the recorded one (or there is nothing to
    /// order).
    NoDrift,
    /// The observed order differs from the recorded one.
    ///
    /// The assignment has already been rewritten to the observed order,
    /// available from [`SurfaceSetTracker::current_order`].
    Drift {
        /// Length of the run of surfaces whose relative order already
        /// matches the recorded order: a prefix of the observed order for
        /// [`Traversal::Forward`], a suffix for [`Traversal::Reversed`].
        stable: usize,
    },
}

/// Tracks the last known order of a container's overlay surfaces.
///
/// The recorded order is an assignment from surface to position. Surfaces
/// are held weakly, so the tracker never keeps a surface alive; entries whose
/// surface has been dropped are purged on the next observation.
pub struct SurfaceSetTracker<S> {
    assignment: Vec<(Weak<S>, usize)>,
    current: Vec<Rc<S>>,
    last: Vec<Rc<S>>,
}

impl<S> core::fmt::Debug for SurfaceSetTracker<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceSetTracker")
            .field("assigned", &self.assignment.len())
            .field("current", &self.current.len())
            .finish_non_exhaustive()
    }
}

impl<S> Default for SurfaceSetTracker<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SurfaceSetTracker<S> {
    /// Creates a tracker with no recorded order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignment: Vec::new(),
            current: Vec::new(),
            last: Vec::new(),
        }
    }

    /// Surfaces observed by the most recent [`observe`](Self::observe), in
    /// draw order. Empty after [`end_pass`](Self::end_pass).
    #[must_use]
    pub fn current_order(&self) -> &[Rc<S>] {
        &self.current
    }

    /// The recorded order: live assigned surfaces sorted by position.
    #[must_use]
    pub fn recorded_order(&self) -> Vec<Rc<S>> {
        let mut entries: Vec<(Rc<S>, usize)> = self
            .assignment
            .iter()
            .filter_map(|(weak, pos)| weak.upgrade().map(|s| (s, *pos)))
            .collect();
        entries.sort_by_key(|(_, pos)| *pos);
        entries.into_iter().map(|(s, _)| s).collect()
    }

    /// Recorded position of `surface`, if it has one.
    #[must_use]
    pub fn position_of(&self, surface: &Rc<S>) -> Option<usize> {
        self.assignment
            .iter()
            .find(|(weak, _)| core::ptr::eq(weak.as_ptr(), Rc::as_ptr(surface)))
            .map(|(_, pos)| *pos)
    }

    /// Number of entries in the assignment, including ones whose surface
    /// has been dropped but not purged yet.
    #[must_use]
    pub fn assigned_len(&self) -> usize {
        self.assignment.len()
    }

    /// Drops the scratch buffers of the current pass.
    pub fn end_pass(&mut self) {
        self.current.clear();
        self.last.clear();
    }

    /// Forgets everything, including the recorded order.
    pub fn clear(&mut self) {
        self.end_pass();
        self.assignment.clear();
    }

    fn load_recorded(&mut self) {
        self.assignment.retain(|(weak, _)| weak.strong_count() > 0);
        self.assignment.sort_by_key(|(_, pos)| *pos);
        self.last.clear();
        self.last
            .extend(self.assignment.iter().filter_map(|(weak, _)| weak.upgrade()));
    }

    fn record_current(&mut self) {
        self.assignment.clear();
        self.assignment.extend(
            self.current
                .iter()
                .enumerate()
                .map(|(pos, s)| (Rc::downgrade(s), pos)),
        );
    }
}

impl<S: OverlaySurface> SurfaceSetTracker<S> {
    /// Collects the container's surfaces and compares them to the recorded
    /// order.
    ///
    /// On [`Observation::Drift`] the assignment is rewritten to the observed
    /// order before returning, so any pass that runs while the caller is
    /// correcting the host sees the corrected state.
    pub fn observe<T>(&mut self, tree: &T, traversal: Traversal) -> Observation
    where
        T: WindowTree<Surface = S>,
    {
        self.end_pass();
        tree.collect_surfaces(&mut self.current);

        if !self.current.iter().all(|s| s.is_attached_to_window()) {
            return Observation::Incomplete;
        }

        self.load_recorded();

        if self.current.is_empty() {
            self.assignment.clear();
            return Observation::NoDrift;
        }
        if same_order(&self.current, &self.last) {
            return Observation::NoDrift;
        }

        let stable = stable_run(&self.current, &self.last, traversal);
        self.record_current();
        Observation::Drift { stable }
    }
}

fn same_order<S>(a: &[Rc<S>], b: &[Rc<S>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Rc::ptr_eq(x, y))
}

/// Length of the longest run of `current`, anchored at the end the host
/// leaves untouched, that appears in `last` in the same relative order.
///
/// Surfaces outside that run are the ones that have to be replayed. The
/// untouched end is the bottom (start) for forward traversal and the top
/// (end) for reversed traversal.
fn stable_run<S>(current: &[Rc<S>], last: &[Rc<S>], traversal: Traversal) -> usize {
    match traversal {
        Traversal::Forward => subsequence_run(current.iter(), last.iter()),
        Traversal::Reversed => subsequence_run(current.iter().rev(), last.iter().rev()),
    }
}

fn subsequence_run<'a, S: 'a>(
    current: impl Iterator<Item = &'a Rc<S>>,
    last: impl Iterator<Item = &'a Rc<S>>,
) -> usize {
    let mut last = last;
    let mut run = 0;
    for surface in current {
        if last.any(|l| Rc::ptr_eq(l, surface)) {
            run += 1;
        } else {
            break;
        }
    }
    run
}
