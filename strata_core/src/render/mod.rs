// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Off-screen rendering into a hardware destination surface.
//!
//! A [`VirtualRenderTarget`] binds a virtual display to the destination
//! surface and shows a modal presentation holding the caller's content on
//! it. Resizing recreates both. Teardown is two-phase: the content is first
//! swapped for a snapshot placeholder and handed back, then the display is
//! released and its removal acknowledged by the host.
//!
//! A [`RenderBridge`] owns one target and drives it from surface lifecycle
//! events delivered through a [`BridgeHandle`].

mod bridge;
mod target;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{BridgeConfig, BridgeHandle, LayoutId, RenderBridge};
pub use target::VirtualRenderTarget;
