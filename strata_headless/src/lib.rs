// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory platform for `strata_core`.
//!
//! This crate simulates the two host behaviors the core has to cope with,
//! without a windowing system:
//!
//! - **[`tree`]**: A container whose composited order is derived from the
//!   order surfaces were attached in, optionally reversed as on older
//!   platforms. Reordering children in layout does not restack them, so the
//!   drift a reconciler corrects is directly observable through
//!   [`HeadlessTree::composited_order`].
//! - **[`hooks`]**: [`LifecycleHooks`](strata_core::host::LifecycleHooks)
//!   for headless surfaces, resolved once per process.
//! - **[`render`]**: A render host that logs operations, queues
//!   acknowledgments until delivered, and faults when two virtual displays
//!   would share a surface.
//! - **[`harness`]**: Polls a render bridge step by step against the host.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `strata_core/trace`.

pub mod harness;
pub mod hooks;
pub mod render;
pub mod tree;

mod queue;

pub use harness::BridgeHarness;
pub use hooks::HeadlessHooks;
pub use render::{
    ContentKind, ContentSnapshot, DisplayId, HeadlessContent, HeadlessDisplay,
    HeadlessPresentation, HeadlessRenderHost, HostOp,
};
pub use tree::{HeadlessSurface, HeadlessTree, SurfaceId};
