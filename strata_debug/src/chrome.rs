// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::trace::TargetPhase;

use crate::recorder::{RecordedEvent, decode};

const PID: u32 = 1;
const TID_RECONCILE: u32 = 0;
const TID_RENDER: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Recordings carry no clock, so each event's timestamp is its position in
/// the recording, in microseconds. Reconciliation passes and hook failures
/// become instant events; each render-target generation becomes an async
/// span from `Created` to `Removed` with its other phases as async instants.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::Reconcile(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Reconcile",
                    "cat": "ZOrder",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_RECONCILE,
                    "s": "t",
                    "args": {
                        "pass": e.pass,
                        "surfaces": e.surfaces,
                        "result": format!("{:?}", e.result),
                        "cycled": e.cycled,
                        "skipped": e.skipped,
                    }
                }));
            }
            RecordedEvent::HookFailure(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "HookFailure",
                    "cat": "ZOrder",
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_RECONCILE,
                    "s": "t",
                    "args": {
                        "pass": e.pass,
                        "position": e.position,
                        "error": e.error.to_string(),
                    }
                }));
            }
            RecordedEvent::Target(e) => {
                let (ph, name) = match e.phase {
                    TargetPhase::Created => ("b", "RenderTarget".to_owned()),
                    TargetPhase::Removed => ("e", "RenderTarget".to_owned()),
                    phase => ("n", format!("{phase:?}")),
                };
                events.push(json!({
                    "ph": ph,
                    "name": name,
                    "cat": "Render",
                    "id": e.generation,
                    "ts": ts,
                    "pid": PID,
                    "tid": TID_RENDER,
                    "args": {
                        "width": e.metrics.width,
                        "height": e.metrics.height,
                        "density_dpi": e.metrics.density_dpi,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
