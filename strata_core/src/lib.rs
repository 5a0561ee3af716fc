// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-order reconciliation and off-screen rendering for hardware overlay
//! surfaces.
//!
//! `strata_core` is `no_std` compatible (with `alloc`) and never talks to a
//! windowing system directly: platform adapters implement the traits in
//! [`host`] and feed host callbacks into the types below. Everything runs on
//! one UI thread; asynchronous host confirmations surface as futures.
//!
//! # Architecture
//!
//! Two independent pipelines share the host contract:
//!
//! ```text
//!   layout pass
//!       │
//!       ▼
//!   ZOrderReconciler ──► SurfaceSetTracker::observe() ──► Observation
//!                                                              │
//!                 ┌────────────────────────────────────────────┘
//!                 ▼
//!   ReattachmentDriver::run() ──► LifecycleHooks ──► WindowTree::request_pre_draw()
//!
//!
//!   surface events ──► BridgeHandle ──► RenderBridge::run()
//!                                           │
//!                                           ▼
//!                              VirtualRenderTarget ──► RenderHost
//!                                           ▲               │
//!                                           └─Acknowledgement┘
//! ```
//!
//! **[`zorder`]**: Detects when the composited order of sibling overlay
//! surfaces drifts from their layout order and replays surface lifecycles to
//! correct it, with a configurable platform ordering quirk.
//!
//! **[`render`]**: Renders a caller-owned content subtree into a
//! destination surface through a virtual display, recreating it on resize
//! and tearing it down in two phases.
//!
//! **[`lifecycle`]**: Folds container attachment and surface existence into
//! one ordered state; the render bridge is active while resumed.
//!
//! **[`ack`]**: One-shot host acknowledgments as cancellable futures.
//!
//! **[`host`]**: Traits platform adapters implement.
//!
//! **[`metrics`]**: Destination-surface geometry.
//!
//! **[`error`]**: Error types.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! reconciliation and render-target instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod ack;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod metrics;
pub mod render;
pub mod trace;
pub mod zorder;
