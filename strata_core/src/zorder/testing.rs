// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-crate test doubles for the window tree.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::error::{HookError, HookKind};
use crate::host::{LifecycleHooks, NodeRole, OverlaySurface, Visibility, WindowTree};

#[derive(Debug)]
pub(crate) struct FakeSurface {
    pub(crate) id: u32,
    pub(crate) attached: Cell<bool>,
    pub(crate) visibility: Cell<Visibility>,
    /// Visibility observed while a hook ran.
    pub(crate) seen_during_hook: Cell<Option<Visibility>>,
}

impl FakeSurface {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            attached: Cell::new(true),
            visibility: Cell::new(Visibility::Visible),
            seen_during_hook: Cell::new(None),
        }
    }

    pub(crate) fn detached() -> Self {
        let s = Self::new(u32::MAX);
        s.attached.set(false);
        s
    }
}

impl OverlaySurface for FakeSurface {
    fn is_attached_to_window(&self) -> bool {
        self.attached.get()
    }

    fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    fn set_visibility(&self, visibility: Visibility) {
        self.visibility.set(visibility);
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeTree {
    pub(crate) surfaces: RefCell<Vec<Rc<FakeSurface>>>,
    pub(crate) attached: Cell<bool>,
    pub(crate) ancestors: Vec<NodeRole>,
    pub(crate) pre_draws: Cell<u32>,
}

impl FakeTree {
    pub(crate) fn new(surfaces: Vec<Rc<FakeSurface>>) -> Self {
        Self {
            surfaces: RefCell::new(surfaces),
            attached: Cell::new(true),
            ancestors: Vec::new(),
            pre_draws: Cell::new(0),
        }
    }

    pub(crate) fn with_surfaces(n: u32) -> Self {
        Self::new((0..n).map(|id| Rc::new(FakeSurface::new(id))).collect())
    }

    pub(crate) fn surfaces(&self) -> Vec<Rc<FakeSurface>> {
        self.surfaces.borrow().clone()
    }

    pub(crate) fn push(&self, surface: Rc<FakeSurface>) {
        self.surfaces.borrow_mut().push(surface);
    }

    pub(crate) fn remove(&self, idx: usize) -> Rc<FakeSurface> {
        self.surfaces.borrow_mut().remove(idx)
    }

    pub(crate) fn set_order(&self, order: Vec<Rc<FakeSurface>>) {
        *self.surfaces.borrow_mut() = order;
    }

    /// Moves the surface at `idx` to the top of the draw order.
    pub(crate) fn bring_to_front(&self, idx: usize) {
        let mut surfaces = self.surfaces.borrow_mut();
        let s = surfaces.remove(idx);
        surfaces.push(s);
    }
}

impl WindowTree for FakeTree {
    type Surface = FakeSurface;

    fn is_attached_to_window(&self) -> bool {
        self.attached.get()
    }

    fn ancestor_roles(&self) -> impl Iterator<Item = NodeRole> + '_ {
        self.ancestors.iter().copied()
    }

    fn collect_surfaces(&self, out: &mut Vec<Rc<FakeSurface>>) {
        out.extend(self.surfaces.borrow().iter().cloned());
    }

    fn request_pre_draw(&self) {
        self.pre_draws.set(self.pre_draws.get() + 1);
    }
}

/// Records `(surface id, hook)` calls; fails for ids in `reject`.
#[derive(Debug, Default)]
pub(crate) struct RecordingHooks {
    pub(crate) calls: RefCell<Vec<(u32, HookKind)>>,
    pub(crate) reject: Vec<u32>,
}

impl RecordingHooks {
    /// Ids in the order their attach hook ran.
    pub(crate) fn attached_ids(&self) -> Vec<u32> {
        self.calls
            .borrow()
            .iter()
            .filter(|(_, kind)| *kind == HookKind::Attach)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl LifecycleHooks<FakeSurface> for RecordingHooks {
    fn detach(&self, surface: &FakeSurface) -> Result<(), HookError> {
        surface.seen_during_hook.set(Some(surface.visibility.get()));
        if self.reject.contains(&surface.id) {
            return Err(HookError::Rejected(HookKind::Detach));
        }
        self.calls.borrow_mut().push((surface.id, HookKind::Detach));
        Ok(())
    }

    fn attach(&self, surface: &FakeSurface) -> Result<(), HookError> {
        self.calls.borrow_mut().push((surface.id, HookKind::Attach));
        Ok(())
    }
}
