// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::metrics::LayerMetrics;
use strata_core::trace::{
    HookFailureEvent, PassResult, ReconcileEvent, TargetEvent, TargetPhase, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn result_name(result: PassResult) -> &'static str {
    match result {
        PassResult::Incomplete => "incomplete",
        PassResult::NoDrift => "no-drift",
        PassResult::Corrected => "corrected",
    }
}

fn phase_name(phase: TargetPhase) -> &'static str {
    match phase {
        TargetPhase::Created => "created",
        TargetPhase::Shown => "shown",
        TargetPhase::Superseded => "superseded",
        TargetPhase::Neutralized => "neutralized",
        TargetPhase::Released => "released",
        TargetPhase::Removed => "removed",
        TargetPhase::WaitCancelled => "wait-cancelled",
    }
}

struct Metrics(LayerMetrics);

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@{}dpi", self.0.width, self.0.height, self.0.density_dpi)
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        let _ = writeln!(
            self.writer,
            "[reconcile] pass={} surfaces={} result={} cycled={} skipped={}",
            e.pass,
            e.surfaces,
            result_name(e.result),
            e.cycled,
            e.skipped,
        );
    }

    fn on_hook_failure(&mut self, e: &HookFailureEvent) {
        let _ = writeln!(
            self.writer,
            "[hook] pass={} position={} error=\"{}\"",
            e.pass, e.position, e.error,
        );
    }

    fn on_target(&mut self, e: &TargetEvent) {
        let _ = writeln!(
            self.writer,
            "[target] gen={} phase={} metrics={}",
            e.generation,
            phase_name(e.phase),
            Metrics(e.metrics),
        );
    }
}
