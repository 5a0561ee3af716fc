// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle of a destination surface and its container.
//!
//! The render bridge only keeps a render target while the container is
//! attached *and* its hardware surface exists. [`SurfaceLifecycle`] folds the
//! two independent host signals into one ordered state:
//!
//! ```text
//!   Initialized ──attach──▶ Started ──surface created──▶ Resumed
//!        │                    ▲  │                          │
//!        │                    │  └──────detach──────▶ Created
//!        │                    └────surface destroyed──────┘
//!        └──────────────────── close ────────────────▶ Destroyed
//! ```
//!
//! The activation window is [`LifecycleState::Resumed`].

/// Ordered lifecycle states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Closed for good. Later events are ignored.
    Destroyed,
    /// Nothing observed yet.
    #[default]
    Initialized,
    /// The container is detached from the window.
    Created,
    /// The container is attached but has no live surface.
    Started,
    /// Attached with a live surface: render targets may exist.
    Resumed,
}

/// Host signals that move the lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The container was attached to the window.
    Attached,
    /// The container was detached from the window.
    Detached,
    /// The container's hardware surface was created.
    SurfaceCreated,
    /// The container's hardware surface was destroyed.
    SurfaceDestroyed,
    /// The owner shut the bridge down.
    Closed,
}

/// Folds container attachment and surface existence into a
/// [`LifecycleState`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceLifecycle {
    state: LifecycleState,
    attached: bool,
    surface: bool,
}

impl SurfaceLifecycle {
    /// A lifecycle that has observed nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Initialized,
            attached: false,
            surface: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the state is [`LifecycleState::Resumed`].
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.state == LifecycleState::Resumed
    }

    /// Whether the state is at least `state`. Always `false` once destroyed.
    #[must_use]
    pub fn is_at_least(&self, state: LifecycleState) -> bool {
        self.state != LifecycleState::Destroyed && self.state >= state
    }

    /// Applies `event` and returns the new state.
    pub fn handle(&mut self, event: LifecycleEvent) -> LifecycleState {
        if self.state == LifecycleState::Destroyed {
            return self.state;
        }
        match event {
            LifecycleEvent::Attached => self.attached = true,
            LifecycleEvent::Detached => self.attached = false,
            LifecycleEvent::SurfaceCreated => self.surface = true,
            LifecycleEvent::SurfaceDestroyed => self.surface = false,
            LifecycleEvent::Closed => {
                self.state = LifecycleState::Destroyed;
                return self.state;
            }
        }
        self.state = match (self.attached, self.surface) {
            (true, true) => LifecycleState::Resumed,
            (true, false) => LifecycleState::Started,
            (false, _) => LifecycleState::Created,
        };
        self.state
    }
}
