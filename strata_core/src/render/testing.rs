// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-crate render host double. Acknowledgments are queued until a test
//! delivers them.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::ack::Acknowledgement;
use crate::host::{
    ContentFor, ContentSubtree, Presentation, PresentationContent, PresentationStyle, RenderHost,
    VirtualDisplay,
};
use crate::metrics::LayerMetrics;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    CreateDisplay(u32, LayerMetrics),
    CreatePresentation(u32),
    View(u32),
    Placeholder(u32),
    Empty(u32),
    Show(u32),
    Release(u32),
}

#[derive(Debug, Default)]
pub(crate) struct HostState {
    pub(crate) ops: Vec<Op>,
    shows: Vec<Acknowledgement>,
    removals: Vec<Acknowledgement>,
    pub(crate) live_displays: u32,
    next_id: u32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FakeHost {
    pub(crate) state: Rc<RefCell<HostState>>,
}

impl FakeHost {
    pub(crate) fn ops(&self) -> Vec<Op> {
        self.state.borrow().ops.clone()
    }

    pub(crate) fn created_displays(&self) -> Vec<LayerMetrics> {
        self.state
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::CreateDisplay(_, m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn ack_shown(&self) {
        let acks = core::mem::take(&mut self.state.borrow_mut().shows);
        for ack in acks {
            ack.resolve();
        }
    }

    pub(crate) fn ack_removed(&self) {
        let acks = {
            let mut state = self.state.borrow_mut();
            let acks = core::mem::take(&mut state.removals);
            state.live_displays -= u32::try_from(acks.len()).unwrap();
            acks
        };
        for ack in acks {
            ack.resolve();
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeContent {
    pub(crate) id: u32,
    pub(crate) has_pixels: bool,
}

impl FakeContent {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            has_pixels: true,
        }
    }
}

impl ContentSubtree for FakeContent {
    type Snapshot = u32;

    fn capture(&self) -> Option<u32> {
        self.has_pixels.then_some(self.id)
    }
}

#[derive(Debug)]
pub(crate) struct FakeDisplay {
    id: u32,
    removed: Acknowledgement,
    state: Rc<RefCell<HostState>>,
}

impl VirtualDisplay for FakeDisplay {
    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.ops.push(Op::Release(self.id));
        state.removals.push(self.removed.clone());
    }
}

#[derive(Debug)]
pub(crate) struct FakePresentation {
    id: u32,
    content: ContentFor<FakeContent>,
    showing: bool,
    shown: Acknowledgement,
    state: Rc<RefCell<HostState>>,
}

impl Presentation for FakePresentation {
    type Content = FakeContent;

    fn set_content(&mut self, content: ContentFor<FakeContent>) -> Option<FakeContent> {
        let op = match &content {
            PresentationContent::View(c) => Op::View(c.id),
            PresentationContent::Placeholder(id) => Op::Placeholder(*id),
            PresentationContent::Empty => Op::Empty(self.id),
        };
        self.state.borrow_mut().ops.push(op);
        match core::mem::replace(&mut self.content, content) {
            PresentationContent::View(c) => Some(c),
            _ => None,
        }
    }

    fn content(&self) -> Option<&FakeContent> {
        match &self.content {
            PresentationContent::View(c) => Some(c),
            _ => None,
        }
    }

    fn show(&mut self) {
        self.showing = true;
        let mut state = self.state.borrow_mut();
        state.ops.push(Op::Show(self.id));
        state.shows.push(self.shown.clone());
    }

    fn is_showing(&self) -> bool {
        self.showing
    }
}

impl RenderHost for FakeHost {
    type Surface = u32;
    type Content = FakeContent;
    type Display = FakeDisplay;
    type Presentation = FakePresentation;

    fn create_virtual_display(
        &self,
        _name: &str,
        _surface: &u32,
        metrics: LayerMetrics,
        on_removed: Acknowledgement,
    ) -> FakeDisplay {
        let mut state = self.state.borrow_mut();
        assert_eq!(
            state.live_displays, 0,
            "display bound while a previous one is not removed"
        );
        state.live_displays += 1;
        state.next_id += 1;
        let id = state.next_id;
        state.ops.push(Op::CreateDisplay(id, metrics));
        FakeDisplay {
            id,
            removed: on_removed,
            state: Rc::clone(&self.state),
        }
    }

    fn create_presentation(
        &self,
        display: &FakeDisplay,
        style: PresentationStyle,
        on_shown: Acknowledgement,
    ) -> FakePresentation {
        assert_eq!(style, PresentationStyle::OVERLAY);
        self.state
            .borrow_mut()
            .ops
            .push(Op::CreatePresentation(display.id));
        FakePresentation {
            id: display.id,
            content: PresentationContent::Empty,
            showing: false,
            shown: on_shown,
            state: Rc::clone(&self.state),
        }
    }
}
