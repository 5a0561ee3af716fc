// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Step-by-step driver for a [`RenderBridge`] on a [`HeadlessRenderHost`].

use std::task::{Context, Poll};

use futures::future::{FutureExt, LocalBoxFuture};
use futures::task::noop_waker_ref;
use strata_core::error::ConfigError;
use strata_core::render::{BridgeConfig, BridgeHandle, RenderBridge};
use strata_core::trace::{TraceSink, Tracer};

use crate::render::{HeadlessContent, HeadlessRenderHost};
use crate::tree::SurfaceId;

type Finished<K> = (RenderBridge<HeadlessRenderHost>, K);

/// Owns a running [`RenderBridge`] and polls it on demand.
///
/// The bridge only waits on acknowledgments and input changes, both of
/// which are level-triggered, so one poll after each host event runs it to
/// its next real suspension point.
pub struct BridgeHarness<K: 'static> {
    host: HeadlessRenderHost,
    handle: BridgeHandle<SurfaceId>,
    run: Option<LocalBoxFuture<'static, Finished<K>>>,
    finished: Option<Finished<K>>,
}

impl<K> core::fmt::Debug for BridgeHarness<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BridgeHarness")
            .field("host", &self.host)
            .field("handle", &self.handle)
            .field("finished", &self.finished.is_some())
            .finish_non_exhaustive()
    }
}

impl<K: TraceSink + 'static> BridgeHarness<K> {
    /// Builds a bridge on `host` with content from
    /// [`HeadlessContent::inflate`] and starts it, tracing into `sink`.
    ///
    /// # Errors
    ///
    /// Returns the bridge's [`ConfigError`].
    pub fn start(host: HeadlessRenderHost, config: BridgeConfig, sink: K) -> Result<Self, ConfigError> {
        let mut bridge = RenderBridge::new(host.clone(), config, HeadlessContent::inflate)?;
        let handle = bridge.handle();
        let run = async move {
            let mut sink = sink;
            bridge.run(&mut Tracer::new(&mut sink)).await;
            (bridge, sink)
        }
        .boxed_local();
        let mut harness = Self {
            host,
            handle,
            run: Some(run),
            finished: None,
        };
        harness.pump();
        Ok(harness)
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &HeadlessRenderHost {
        &self.host
    }

    /// Handle for delivering surface events. Call [`pump`](Self::pump)
    /// afterwards to let the bridge react.
    #[must_use]
    pub fn handle(&self) -> &BridgeHandle<SurfaceId> {
        &self.handle
    }

    /// Lets the bridge run to its next suspension point. Returns `true` once
    /// it has finished.
    pub fn pump(&mut self) -> bool {
        if let Some(run) = &mut self.run {
            let mut cx = Context::from_waker(noop_waker_ref());
            if let Poll::Ready(done) = run.poll_unpin(&mut cx) {
                self.run = None;
                self.finished = Some(done);
            }
        }
        self.finished.is_some()
    }

    /// Delivers acknowledgments and pumps until the host has nothing left
    /// to deliver.
    pub fn settle(&mut self) {
        self.pump();
        while self.host.flush() > 0 {
            self.pump();
        }
    }

    /// Closes the bridge, settles it, and returns it with the trace sink.
    ///
    /// Returns `None` if the bridge is still waiting on something the host
    /// cannot deliver.
    pub fn close(mut self) -> Option<(RenderBridge<HeadlessRenderHost>, K)> {
        self.handle.close();
        self.settle();
        self.finished.take()
    }
}

#[cfg(test)]
mod tests {
    use strata_core::lifecycle::LifecycleState;
    use strata_core::metrics::LayerMetrics;
    use strata_core::trace::{NoopSink, TargetEvent, TargetPhase};

    use super::*;
    use crate::render::{ContentKind, DisplayId, HostOp};

    const M1: LayerMetrics = LayerMetrics::new(640, 480, 160);
    const M2: LayerMetrics = LayerMetrics::new(1280, 720, 240);

    fn config() -> BridgeConfig {
        BridgeConfig::new("overlay").with_content_layout(11)
    }

    fn resumed(metrics: LayerMetrics) -> BridgeHarness<NoopSink> {
        let mut h = BridgeHarness::start(HeadlessRenderHost::new(), config(), NoopSink).unwrap();
        h.handle().attached();
        h.handle().surface_created(SurfaceId(0));
        h.handle().size_changed(metrics);
        h.pump();
        h
    }

    #[test]
    fn size_changes_without_a_frame_create_one_target() {
        let mut h = BridgeHarness::start(HeadlessRenderHost::new(), config(), NoopSink).unwrap();
        h.handle().attached();
        h.handle().surface_created(SurfaceId(0));
        h.handle().size_changed(M1);
        h.handle().size_changed(M2);
        h.settle();

        assert_eq!(h.host().created_metrics(), vec![M2]);
        assert_eq!(h.host().bound_displays(), 1);
    }

    #[test]
    fn second_resize_before_show_binds_latest_metrics() {
        let mut h = resumed(M1);
        h.handle().size_changed(M2);
        h.pump();
        assert_eq!(h.host().pending(), (1, 1), "show of M1 and removal both pending");

        h.settle();
        assert_eq!(h.host().created_metrics(), vec![M1, M2]);
        assert_eq!(h.host().bound_displays(), 1);
    }

    #[test]
    fn destroyed_surface_runs_two_phase_teardown() {
        let mut h = resumed(M1);
        h.settle();
        h.handle().surface_destroyed();
        h.pump();

        let ops = h.host().ops();
        let tail = &ops[ops.len() - 2..];
        assert_eq!(
            tail,
            &[
                HostOp::SetContent {
                    display: DisplayId(0),
                    content: ContentKind::Placeholder(11),
                },
                HostOp::Release {
                    display: DisplayId(0)
                },
            ]
        );
        h.settle();
        assert_eq!(h.handle().state(), LifecycleState::Started);
        assert_eq!(h.host().bound_displays(), 0);

        let (mut bridge, _) = h.close().unwrap();
        let content = bridge.take_content().unwrap();
        assert_eq!(content.layout(), 11);
    }

    #[test]
    fn immediate_host_never_overlaps_displays() {
        let mut h =
            BridgeHarness::start(HeadlessRenderHost::immediate(), config(), NoopSink).unwrap();
        h.handle().attached();
        h.handle().surface_created(SurfaceId(3));
        for width in [100, 200, 300] {
            h.handle().size_changed(LayerMetrics::new(width, 100, 160));
            h.pump();
        }
        assert_eq!(h.host().bound_displays(), 1);
        assert_eq!(h.host().created_metrics().len(), 3);
        assert!(h.close().is_some());
    }

    #[derive(Default)]
    struct Phases(Vec<TargetPhase>);

    impl TraceSink for Phases {
        fn on_target(&mut self, e: &TargetEvent) {
            self.0.push(e.phase);
        }
    }

    #[test]
    fn superseded_show_is_traced() {
        let mut h = BridgeHarness::start(HeadlessRenderHost::new(), config(), Phases::default())
            .unwrap();
        h.handle().attached();
        h.handle().surface_created(SurfaceId(0));
        h.handle().size_changed(M1);
        h.pump();
        h.handle().size_changed(M2);
        h.settle();

        let (_, phases) = h.close().unwrap();
        if cfg!(feature = "trace") {
            assert!(phases.0.contains(&TargetPhase::Superseded));
        } else {
            assert!(phases.0.is_empty());
        }
    }
}
