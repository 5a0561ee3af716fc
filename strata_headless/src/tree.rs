// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated container whose composited order follows attach order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strata_core::host::{NodeRole, OverlaySurface, Visibility, WindowTree};

/// Identity of a [`HeadlessSurface`] within its tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

/// An overlay surface in a [`HeadlessTree`].
///
/// The surface remembers when it was last attached to the window; the tree
/// derives composited order from those stamps, the way overlay hosts do.
#[derive(Debug)]
pub struct HeadlessSurface {
    id: SurfaceId,
    attached: Cell<bool>,
    visibility: Cell<Visibility>,
    attach_stamp: Cell<u64>,
    clock: Rc<Cell<u64>>,
    /// Visibility observed by each lifecycle callback, oldest first.
    hook_visibility: RefCell<Vec<Visibility>>,
}

impl HeadlessSurface {
    /// Identity.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Stamp of the most recent attach; larger is later.
    #[must_use]
    pub fn attach_stamp(&self) -> u64 {
        self.attach_stamp.get()
    }

    /// Visibility the surface had whenever a lifecycle callback ran.
    #[must_use]
    pub fn hook_visibility(&self) -> Vec<Visibility> {
        self.hook_visibility.borrow().clone()
    }

    /// The host's "attached to window" callback.
    pub fn dispatch_attached(&self) {
        self.hook_visibility.borrow_mut().push(self.visibility.get());
        let stamp = self.clock.get() + 1;
        self.clock.set(stamp);
        self.attach_stamp.set(stamp);
        self.attached.set(true);
    }

    /// The host's "detached from window" callback.
    pub fn dispatch_detached(&self) {
        self.hook_visibility.borrow_mut().push(self.visibility.get());
        self.attached.set(false);
    }
}

impl OverlaySurface for HeadlessSurface {
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

/// A container view holding overlay surfaces in layout order.
///
/// Surfaces added to an attached tree are attached immediately. The
/// composited order ([`composited_order`](Self::composited_order)) is
/// derived from attach stamps and ignores layout order, so reordering
/// children produces the drift a reconciler has to correct.
#[derive(Debug)]
pub struct HeadlessTree {
    children: RefCell<Vec<Rc<HeadlessSurface>>>,
    attached: Cell<bool>,
    ancestors: Vec<NodeRole>,
    /// Later attaches draw below earlier ones.
    reversed: bool,
    clock: Rc<Cell<u64>>,
    next_id: Cell<u32>,
    pre_draws: Cell<u32>,
}

impl HeadlessTree {
    /// An attached, top-level container on a platform where later
    /// attaches draw on top unless `reversed`.
    #[must_use]
    pub fn new(reversed: bool) -> Self {
        Self {
            children: RefCell::new(Vec::new()),
            attached: Cell::new(true),
            ancestors: Vec::new(),
            reversed,
            clock: Rc::new(Cell::new(0)),
            next_id: Cell::new(0),
            pre_draws: Cell::new(0),
        }
    }

    /// Returns the tree placed under ancestors with `roles`, nearest first.
    #[must_use]
    pub fn with_ancestors(mut self, roles: Vec<NodeRole>) -> Self {
        self.ancestors = roles;
        self
    }

    /// Appends a new surface on top of the layout order.
    pub fn add_surface(&self) -> Rc<HeadlessSurface> {
        let id = SurfaceId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let surface = Rc::new(HeadlessSurface {
            id,
            attached: Cell::new(false),
            visibility: Cell::new(Visibility::Visible),
            attach_stamp: Cell::new(0),
            clock: Rc::clone(&self.clock),
            hook_visibility: RefCell::new(Vec::new()),
        });
        if self.attached.get() {
            self.stamp_attached(&surface);
        }
        self.children.borrow_mut().push(Rc::clone(&surface));
        surface
    }

    /// Removes a surface from the tree and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a child of this tree.
    pub fn remove(&self, id: SurfaceId) -> Rc<HeadlessSurface> {
        let mut children = self.children.borrow_mut();
        let idx = Self::index_of(&children, id);
        let surface = children.remove(idx);
        surface.attached.set(false);
        surface
    }

    /// Moves a surface to `index` in layout order without touching its
    /// attachment, as a view reorder does.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a child or `index` is out of bounds.
    pub fn move_to(&self, id: SurfaceId, index: usize) {
        let mut children = self.children.borrow_mut();
        let from = Self::index_of(&children, id);
        let surface = children.remove(from);
        assert!(
            index <= children.len(),
            "layout index {index} out of bounds for {} surfaces",
            children.len() + 1
        );
        children.insert(index, surface);
    }

    /// Moves a surface to the top of the layout order.
    pub fn bring_to_front(&self, id: SurfaceId) {
        let last = self.children.borrow().len().saturating_sub(1);
        self.move_to(id, last);
    }

    /// Attaches the container and every child to the window.
    pub fn attach_to_window(&self) {
        self.attached.set(true);
        for surface in self.children.borrow().iter() {
            self.stamp_attached(surface);
        }
    }

    /// Detaches the container and every child from the window.
    pub fn detach_from_window(&self) {
        self.attached.set(false);
        for surface in self.children.borrow().iter() {
            surface.attached.set(false);
        }
    }

    /// Children in layout order, bottom first.
    #[must_use]
    pub fn layout_order(&self) -> Vec<SurfaceId> {
        self.children.borrow().iter().map(|s| s.id).collect()
    }

    /// Attached children in the order the compositor draws them, bottom
    /// first.
    #[must_use]
    pub fn composited_order(&self) -> Vec<SurfaceId> {
        let mut attached: Vec<_> = self
            .children
            .borrow()
            .iter()
            .filter(|s| s.attached.get())
            .map(|s| (s.attach_stamp(), s.id))
            .collect();
        attached.sort_unstable();
        if self.reversed {
            attached.reverse();
        }
        attached.into_iter().map(|(_, id)| id).collect()
    }

    /// Whether composited order equals layout order.
    #[must_use]
    pub fn is_in_order(&self) -> bool {
        self.composited_order() == self.layout_order()
    }

    /// Number of pre-draw passes requested so far.
    #[must_use]
    pub fn pre_draw_requests(&self) -> u32 {
        self.pre_draws.get()
    }

    fn stamp_attached(&self, surface: &HeadlessSurface) {
        let stamp = self.clock.get() + 1;
        self.clock.set(stamp);
        surface.attach_stamp.set(stamp);
        surface.attached.set(true);
    }

    fn index_of(children: &[Rc<HeadlessSurface>], id: SurfaceId) -> usize {
        children
            .iter()
            .position(|s| s.id == id)
            .unwrap_or_else(|| panic!("{id:?} is not a child of this tree"))
    }
}

impl WindowTree for HeadlessTree {
    type Surface = HeadlessSurface;

    fn is_attached_to_window(&self) -> bool {
        self.attached.get()
    }

    fn ancestor_roles(&self) -> impl Iterator<Item = NodeRole> + '_ {
        self.ancestors.iter().copied()
    }

    fn collect_surfaces(&self, out: &mut Vec<Rc<HeadlessSurface>>) {
        out.extend(self.children.borrow().iter().cloned());
    }

    fn request_pre_draw(&self) {
        self.pre_draws.set(self.pre_draws.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<SurfaceId> {
        raw.iter().copied().map(SurfaceId).collect()
    }

    #[test]
    fn composited_order_follows_attach_order() {
        let tree = HeadlessTree::new(false);
        let a = tree.add_surface();
        let _b = tree.add_surface();
        assert_eq!(tree.composited_order(), ids(&[0, 1]));

        tree.bring_to_front(a.id());
        assert_eq!(tree.layout_order(), ids(&[1, 0]));
        assert_eq!(tree.composited_order(), ids(&[0, 1]), "reorder alone does not restack");
        assert!(!tree.is_in_order());

        a.dispatch_detached();
        a.dispatch_attached();
        assert!(tree.is_in_order());
    }

    #[test]
    fn reversed_platform_stacks_later_attaches_below() {
        let tree = HeadlessTree::new(true);
        let _a = tree.add_surface();
        let _b = tree.add_surface();
        assert_eq!(tree.composited_order(), ids(&[1, 0]));
    }

    #[test]
    fn detached_surfaces_are_not_composited() {
        let tree = HeadlessTree::new(false);
        let a = tree.add_surface();
        let _b = tree.add_surface();
        a.dispatch_detached();
        assert_eq!(tree.composited_order(), ids(&[1]));
        assert!(!a.is_attached_to_window());
    }

    #[test]
    fn window_detach_detaches_children() {
        let tree = HeadlessTree::new(false);
        let a = tree.add_surface();
        tree.detach_from_window();
        assert!(!a.is_attached_to_window());
        let b = tree.add_surface();
        assert!(!b.is_attached_to_window(), "no attach while the container is detached");
        tree.attach_to_window();
        assert!(a.is_attached_to_window() && b.is_attached_to_window());
    }

    #[test]
    #[should_panic(expected = "is not a child of this tree")]
    fn moving_a_foreign_surface_panics() {
        let tree = HeadlessTree::new(false);
        tree.move_to(SurfaceId(9), 0);
    }
}
