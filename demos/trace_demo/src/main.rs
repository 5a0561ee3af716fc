// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless session that exercises the tracing and diagnostics pipeline.
//!
//! Reorders overlay surfaces on both a current and a legacy platform while a
//! reconciler keeps their composited order in line, then drives a render
//! bridge through resizes and a surface loss. Events go to both a
//! [`PrettyPrintSink`] and a [`RecorderSink`], and the recording is exported
//! as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use strata_core::metrics::LayerMetrics;
use strata_core::render::BridgeConfig;
use strata_core::trace::{HookFailureEvent, ReconcileEvent, TargetEvent, TraceSink, Tracer};
use strata_core::zorder::{ReattachScope, ReconcilerConfig, ZOrderReconciler};
use strata_debug::pretty::PrettyPrintSink;
use strata_debug::recorder::RecorderSink;
use strata_headless::{BridgeHarness, HeadlessHooks, HeadlessRenderHost, HeadlessTree, SurfaceId};

const SURFACE_COUNT: u32 = 4;

/// Forwards every event to both sinks.
struct Tee {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Tee {
    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        self.pretty.on_reconcile(e);
        self.recorder.on_reconcile(e);
    }

    fn on_hook_failure(&mut self, e: &HookFailureEvent) {
        self.pretty.on_hook_failure(e);
        self.recorder.on_hook_failure(e);
    }

    fn on_target(&mut self, e: &TargetEvent) {
        self.pretty.on_target(e);
        self.recorder.on_target(e);
    }
}

fn main() {
    let mut tee = Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder: RecorderSink::new(),
    };

    // -- z-order ------------------------------------------------------------
    for config in [
        ReconcilerConfig::new(30),
        ReconcilerConfig::legacy().with_scope(ReattachScope::Minimal),
    ] {
        println!("-- {config:?}");
        let tree = HeadlessTree::new(config.platform_version < config.reversal_threshold);
        for _ in 0..SURFACE_COUNT {
            let _ = tree.add_surface();
        }
        let hooks = HeadlessHooks::resolve();
        println!("   lifecycle hooks available: {}", hooks.is_available());
        let mut reconciler = ZOrderReconciler::new(config, hooks);
        reconciler.on_attached_to_window(&tree);

        let mut tracer = Tracer::new(&mut tee);
        for step in 0..SURFACE_COUNT {
            if step > 0 {
                tree.bring_to_front(SurfaceId(step - 1));
            }
            reconciler.on_layout();
            let outcome = reconciler.on_global_layout(&tree, &mut tracer);
            println!(
                "   {outcome:?} composited={:?} in_order={}",
                tree.composited_order(),
                tree.is_in_order()
            );
        }
        reconciler.on_detached_from_window();
    }

    // -- render bridge --------------------------------------------------------
    println!("-- render bridge");
    let config = BridgeConfig::new("overlay").with_content_layout(1);
    let mut harness = BridgeHarness::start(HeadlessRenderHost::new(), config, tee)
        .expect("bridge config has a content layout");
    let handle = harness.handle().clone();
    handle.attached();
    handle.surface_created(SurfaceId(0));
    handle.size_changed(LayerMetrics::new(640, 480, 160));
    harness.pump();
    // A resize lands before the host acknowledges the first presentation.
    handle.size_changed(LayerMetrics::new(1280, 720, 240));
    harness.settle();
    handle.configuration_changed(320);
    harness.settle();
    handle.surface_destroyed();
    harness.settle();

    let ops = harness.host().ops().len();
    let (_, tee) = harness
        .close()
        .expect("headless host delivers every acknowledgment");
    println!("   {ops} host operations");

    // -- export Chrome trace --------------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    strata_debug::chrome::export(tee.recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path}");
}
