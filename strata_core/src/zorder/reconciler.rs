// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container reconciliation state machine.

use alloc::vec::Vec;

use crate::host::{LifecycleHooks, NodeRole, OverlaySurface, WindowTree};
use crate::trace::{PassResult, ReconcileEvent, Tracer};

use super::reattach::{ReattachReport, ReattachmentDriver};
use super::tracker::{Observation, SurfaceSetTracker};
use super::ReconcilerConfig;

/// Where a [`ZOrderReconciler`] is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReconcilerState {
    /// Detached, or nested inside another reconciling container.
    #[default]
    Inactive,
    /// Waiting for global-layout notifications.
    Armed,
    /// Running a pass.
    Reconciling,
}

/// Result of [`ZOrderReconciler::on_global_layout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The reconciler is not armed; nothing was inspected.
    Inactive,
    /// No layout happened since the previous pass.
    NoLayout,
    /// A surface was not attached yet; the pass was skipped.
    Incomplete,
    /// Surface order matched the recorded order.
    NoDrift,
    /// Drift was corrected.
    Corrected(ReattachReport),
}

/// Keeps the composited order of a container's overlay surfaces in sync
/// with their layout order.
///
/// The host forwards four callbacks of the container view:
///
/// - [`on_attached_to_window`](Self::on_attached_to_window)
/// - [`on_layout`](Self::on_layout)
/// - [`on_global_layout`](Self::on_global_layout)
/// - [`on_detached_from_window`](Self::on_detached_from_window)
///
/// A reconciler whose container sits inside another reconciling container
/// never acts: the outer one already covers every descendant surface.
pub struct ZOrderReconciler<S, K> {
    config: ReconcilerConfig,
    state: ReconcilerState,
    nested: bool,
    layout_pending: bool,
    pass: u64,
    tracker: SurfaceSetTracker<S>,
    driver: ReattachmentDriver<K>,
    plan: Vec<usize>,
}

impl<S, K> core::fmt::Debug for ZOrderReconciler<S, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ZOrderReconciler")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("nested", &self.nested)
            .field("layout_pending", &self.layout_pending)
            .field("pass", &self.pass)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl<S, K> ZOrderReconciler<S, K> {
    /// Creates an inactive reconciler.
    #[must_use]
    pub fn new(config: ReconcilerConfig, hooks: K) -> Self {
        Self {
            config,
            state: ReconcilerState::Inactive,
            nested: false,
            layout_pending: false,
            pass: 0,
            tracker: SurfaceSetTracker::new(),
            driver: ReattachmentDriver::new(hooks, config.traversal()),
            plan: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ReconcilerState {
        self.state
    }

    /// Whether the container was found nested in another reconciling
    /// container on its last attach.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.nested
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// The tracker holding the recorded order.
    #[must_use]
    pub const fn tracker(&self) -> &SurfaceSetTracker<S> {
        &self.tracker
    }

    /// Number of passes that inspected surfaces.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.pass
    }

    /// The container was attached to the window.
    ///
    /// Arms the reconciler unless an ancestor is itself a reconciling
    /// container. A callback arriving while the host reports the container
    /// as detached is ignored.
    pub fn on_attached_to_window<T: WindowTree>(&mut self, tree: &T) {
        if !tree.is_attached_to_window() {
            tracing::debug!("attach callback for a detached container, staying inactive");
            self.state = ReconcilerState::Inactive;
            return;
        }
        self.nested = tree
            .ancestor_roles()
            .any(|role| role == NodeRole::ZOrderContainer);
        if self.nested {
            tracing::debug!("nested z-order container, staying inactive");
            self.state = ReconcilerState::Inactive;
        } else {
            self.state = ReconcilerState::Armed;
        }
    }

    /// The container ran a layout.
    pub fn on_layout(&mut self) {
        self.layout_pending = true;
    }

    /// The container was detached from the window. Forgets all order state.
    pub fn on_detached_from_window(&mut self) {
        self.state = ReconcilerState::Inactive;
        self.nested = false;
        self.layout_pending = false;
        self.tracker.clear();
        self.plan.clear();
    }
}

impl<S, K> ZOrderReconciler<S, K>
where
    S: OverlaySurface,
    K: LifecycleHooks<S>,
{
    /// The host finished a global layout.
    ///
    /// Runs one reconciliation pass if armed and a layout happened since the
    /// previous pass. An [`Incomplete`](ReconcileOutcome::Incomplete) pass
    /// is retried on the next notification.
    pub fn on_global_layout<T>(&mut self, tree: &T, tracer: &mut Tracer<'_>) -> ReconcileOutcome
    where
        T: WindowTree<Surface = S>,
    {
        if self.state != ReconcilerState::Armed {
            return ReconcileOutcome::Inactive;
        }
        if !self.layout_pending {
            return ReconcileOutcome::NoLayout;
        }
        self.layout_pending = false;
        self.state = ReconcilerState::Reconciling;
        let outcome = self.reconcile(tree, tracer);
        if outcome == ReconcileOutcome::Incomplete {
            self.layout_pending = true;
        }
        self.state = ReconcilerState::Armed;
        outcome
    }

    fn reconcile<T>(&mut self, tree: &T, tracer: &mut Tracer<'_>) -> ReconcileOutcome
    where
        T: WindowTree<Surface = S>,
    {
        let pass = self.pass;
        self.pass += 1;

        let observation = self.tracker.observe(tree, self.driver.traversal());
        let order = self.tracker.current_order();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "surface counts are far below u32::MAX"
        )]
        let surfaces = order.len() as u32;

        let (outcome, result, report) = match observation {
            Observation::Incomplete => (
                ReconcileOutcome::Incomplete,
                PassResult::Incomplete,
                ReattachReport::default(),
            ),
            Observation::NoDrift => (
                ReconcileOutcome::NoDrift,
                PassResult::NoDrift,
                ReattachReport::default(),
            ),
            Observation::Drift { stable } => {
                self.driver
                    .plan_into(order.len(), stable, self.config.scope, &mut self.plan);
                tracing::trace!(pass, surfaces, stable, replay = self.plan.len(), "z-order drift");
                let report = self.driver.run(tree, order, &self.plan, pass, tracer);
                (
                    ReconcileOutcome::Corrected(report),
                    PassResult::Corrected,
                    report,
                )
            }
        };

        tracer.reconcile(&ReconcileEvent {
            pass,
            surfaces,
            result,
            cycled: report.cycled,
            skipped: report.skipped,
        });
        self.tracker.end_pass();
        self.plan.clear();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;

    use super::*;
    use crate::zorder::testing::{FakeSurface, FakeTree, RecordingHooks};
    use crate::zorder::{ReattachScope, Traversal};

    fn armed<'h>(
        tree: &FakeTree,
        config: ReconcilerConfig,
        hooks: &'h RecordingHooks,
    ) -> ZOrderReconciler<FakeSurface, &'h RecordingHooks> {
        let mut r = ZOrderReconciler::new(config, hooks);
        r.on_attached_to_window(tree);
        r
    }

    fn pass(
        r: &mut ZOrderReconciler<FakeSurface, &RecordingHooks>,
        tree: &FakeTree,
    ) -> ReconcileOutcome {
        r.on_layout();
        r.on_global_layout(tree, &mut Tracer::none())
    }

    fn ids(tree: &FakeTree) -> Vec<u32> {
        tree.surfaces().iter().map(|s| s.id).collect()
    }

    #[test]
    fn starts_inactive_and_arms_on_attach() {
        let tree = FakeTree::with_surfaces(1);
        let hooks = RecordingHooks::default();
        let mut r = ZOrderReconciler::new(ReconcilerConfig::new(30), &hooks);
        assert_eq!(r.state(), ReconcilerState::Inactive);
        r.on_layout();
        assert_eq!(
            r.on_global_layout(&tree, &mut Tracer::none()),
            ReconcileOutcome::Inactive
        );
        r.on_attached_to_window(&tree);
        assert_eq!(r.state(), ReconcilerState::Armed);
    }

    #[test]
    fn attach_callback_on_detached_container_stays_inactive() {
        let tree = FakeTree::with_surfaces(2);
        tree.attached.set(false);
        let hooks = RecordingHooks::default();
        let mut r = ZOrderReconciler::new(ReconcilerConfig::new(30), &hooks);
        r.on_attached_to_window(&tree);
        assert_eq!(r.state(), ReconcilerState::Inactive);
        r.on_layout();
        assert_eq!(
            r.on_global_layout(&tree, &mut Tracer::none()),
            ReconcileOutcome::Inactive
        );

        tree.attached.set(true);
        r.on_attached_to_window(&tree);
        assert_eq!(r.state(), ReconcilerState::Armed);
    }

    #[test]
    fn global_layout_without_layout_does_nothing() {
        let tree = FakeTree::with_surfaces(2);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        assert_eq!(
            r.on_global_layout(&tree, &mut Tracer::none()),
            ReconcileOutcome::NoLayout
        );
        assert!(hooks.calls.borrow().is_empty());
    }

    #[test]
    fn matching_order_triggers_no_reattachment() {
        let tree = FakeTree::with_surfaces(3);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        assert!(matches!(pass(&mut r, &tree), ReconcileOutcome::Corrected(_)));
        hooks.calls.borrow_mut().clear();

        assert_eq!(pass(&mut r, &tree), ReconcileOutcome::NoDrift);
        assert!(hooks.calls.borrow().is_empty());
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let tree = FakeTree::with_surfaces(3);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        let _ = pass(&mut r, &tree);
        tree.bring_to_front(0);

        assert!(matches!(pass(&mut r, &tree), ReconcileOutcome::Corrected(_)));
        assert_eq!(pass(&mut r, &tree), ReconcileOutcome::NoDrift);
        assert_eq!(tree.pre_draws.get(), 2, "initial pass plus one correction");
    }

    #[test]
    fn assignment_matches_observed_order_after_drift() {
        let tree = FakeTree::with_surfaces(4);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::legacy(), &hooks);
        let _ = pass(&mut r, &tree);

        tree.bring_to_front(1);
        let _removed = tree.remove(0);
        let _ = pass(&mut r, &tree);

        let recorded: Vec<u32> = r.tracker().recorded_order().iter().map(|s| s.id).collect();
        assert_eq!(recorded, ids(&tree));
        assert_eq!(r.tracker().assigned_len(), 3, "no entry for removed surface");
    }

    #[test]
    fn traversal_is_reversed_before_threshold() {
        for (config, expected) in [
            (ReconcilerConfig::new(30), vec![0, 1, 2]),
            (ReconcilerConfig::new(21), vec![2, 1, 0]),
        ] {
            let tree = FakeTree::with_surfaces(3);
            let hooks = RecordingHooks::default();
            let mut r = armed(&tree, config, &hooks);
            let _ = pass(&mut r, &tree);
            assert_eq!(hooks.attached_ids(), expected, "{config:?}");
        }
    }

    #[test]
    fn nested_reconciler_never_reattaches() {
        let mut tree = FakeTree::with_surfaces(3);
        tree.ancestors = vec![NodeRole::Plain, NodeRole::ZOrderContainer];
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        assert!(r.is_nested());
        assert_eq!(r.state(), ReconcilerState::Inactive);

        for _ in 0..3 {
            assert_eq!(pass(&mut r, &tree), ReconcileOutcome::Inactive);
            tree.bring_to_front(0);
        }
        assert!(hooks.calls.borrow().is_empty());
        assert_eq!(tree.pre_draws.get(), 0);
    }

    #[test]
    fn detach_discards_order_state() {
        let tree = FakeTree::with_surfaces(2);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        let _ = pass(&mut r, &tree);
        assert_eq!(r.tracker().assigned_len(), 2);

        r.on_layout();
        r.on_detached_from_window();
        assert_eq!(r.state(), ReconcilerState::Inactive);
        assert_eq!(r.tracker().assigned_len(), 0);

        r.on_attached_to_window(&tree);
        assert_eq!(
            r.on_global_layout(&tree, &mut Tracer::none()),
            ReconcileOutcome::NoLayout,
            "pending layout flag does not survive detach"
        );
    }

    #[test]
    fn incomplete_pass_is_retried_on_next_global_layout() {
        let tree = FakeTree::with_surfaces(2);
        tree.surfaces()[1].attached.set(false);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        assert_eq!(pass(&mut r, &tree), ReconcileOutcome::Incomplete);

        tree.surfaces()[1].attached.set(true);
        assert!(
            matches!(
                r.on_global_layout(&tree, &mut Tracer::none()),
                ReconcileOutcome::Corrected(_)
            ),
            "retried without another layout"
        );
        assert_eq!(
            r.on_global_layout(&tree, &mut Tracer::none()),
            ReconcileOutcome::NoLayout
        );
    }

    #[test]
    fn bring_to_front_replays_minimal_set() {
        // [A, B, C] recorded; layout moves B to the front, giving [A, C, B].
        let tree = FakeTree::with_surfaces(3);
        let hooks = RecordingHooks::default();
        let config = ReconcilerConfig::new(30).with_scope(ReattachScope::Minimal);
        let mut r = armed(&tree, config, &hooks);
        let _ = pass(&mut r, &tree);
        hooks.calls.borrow_mut().clear();

        tree.bring_to_front(1);
        let outcome = pass(&mut r, &tree);
        assert_eq!(
            outcome,
            ReconcileOutcome::Corrected(ReattachReport { cycled: 1, skipped: 0 })
        );
        assert_eq!(hooks.attached_ids(), vec![1], "only B needs to move on top");
        let recorded: Vec<u32> = r.tracker().recorded_order().iter().map(|s| s.id).collect();
        assert_eq!(recorded, vec![0, 2, 1]);
    }

    #[test]
    fn bring_to_front_replays_minimal_set_reversed() {
        let tree = FakeTree::with_surfaces(3);
        let hooks = RecordingHooks::default();
        let config = ReconcilerConfig::legacy().with_scope(ReattachScope::Minimal);
        let mut r = armed(&tree, config, &hooks);
        assert_eq!(r.config().traversal(), Traversal::Reversed);
        let _ = pass(&mut r, &tree);
        hooks.calls.borrow_mut().clear();

        tree.bring_to_front(1);
        let _ = pass(&mut r, &tree);
        // B stays on top untouched; C then A are pushed beneath it.
        assert_eq!(hooks.attached_ids(), vec![2, 0]);
    }

    #[test]
    fn surfaces_are_held_weakly() {
        let tree = FakeTree::with_surfaces(2);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        let _ = pass(&mut r, &tree);

        let removed = tree.remove(1);
        let weak = Rc::downgrade(&removed);
        drop(removed);
        assert!(weak.upgrade().is_none(), "reconciler must not keep surfaces alive");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn passes_are_traced() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Sink(Vec<ReconcileEvent>);
        impl TraceSink for Sink {
            fn on_reconcile(&mut self, e: &ReconcileEvent) {
                self.0.push(*e);
            }
        }

        let tree = FakeTree::with_surfaces(2);
        let hooks = RecordingHooks::default();
        let mut r = armed(&tree, ReconcilerConfig::new(30), &hooks);
        let mut sink = Sink::default();
        r.on_layout();
        let _ = r.on_global_layout(&tree, &mut Tracer::new(&mut sink));
        r.on_layout();
        let _ = r.on_global_layout(&tree, &mut Tracer::new(&mut sink));

        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[0].result, PassResult::Corrected);
        assert_eq!(sink.0[0].cycled, 2);
        assert_eq!(sink.0[1].result, PassResult::NoDrift);
        assert_eq!(sink.0[1].pass, 1);
    }
}
