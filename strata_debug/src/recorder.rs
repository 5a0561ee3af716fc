// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use strata_core::error::{HookError, HookKind};
use strata_core::metrics::LayerMetrics;
use strata_core::trace::{
    HookFailureEvent, PassResult, ReconcileEvent, TargetEvent, TargetPhase, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RECONCILE: u8 = 1;
const TAG_HOOK_FAILURE: u8 = 2;
const TAG_TARGET: u8 = 3;

const HOOK_UNAVAILABLE: u8 = 0;
const HOOK_REJECTED: u8 = 1;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_pass_result(&mut self, r: PassResult) {
        self.write_u8(match r {
            PassResult::Incomplete => 0,
            PassResult::NoDrift => 1,
            PassResult::Corrected => 2,
        });
    }

    fn write_hook_error(&mut self, e: HookError) {
        self.write_u8(match e {
            HookError::Unavailable(_) => HOOK_UNAVAILABLE,
            HookError::Rejected(_) => HOOK_REJECTED,
        });
        self.write_u8(match e.kind() {
            HookKind::Detach => 0,
            HookKind::Attach => 1,
        });
    }

    fn write_target_phase(&mut self, p: TargetPhase) {
        self.write_u8(match p {
            TargetPhase::Created => 0,
            TargetPhase::Shown => 1,
            TargetPhase::Superseded => 2,
            TargetPhase::Neutralized => 3,
            TargetPhase::Released => 4,
            TargetPhase::Removed => 5,
            TargetPhase::WaitCancelled => 6,
        });
    }

    fn write_metrics(&mut self, m: LayerMetrics) {
        self.write_u32(m.width);
        self.write_u32(m.height);
        self.write_u32(m.density_dpi);
    }
}

impl TraceSink for RecorderSink {
    fn on_reconcile(&mut self, e: &ReconcileEvent) {
        self.write_u8(TAG_RECONCILE);
        self.write_u64(e.pass);
        self.write_u32(e.surfaces);
        self.write_pass_result(e.result);
        self.write_u32(e.cycled);
        self.write_u32(e.skipped);
    }

    fn on_hook_failure(&mut self, e: &HookFailureEvent) {
        self.write_u8(TAG_HOOK_FAILURE);
        self.write_u64(e.pass);
        self.write_u32(e.position);
        self.write_hook_error(e.error);
    }

    fn on_target(&mut self, e: &TargetEvent) {
        self.write_u8(TAG_TARGET);
        self.write_u64(e.generation);
        self.write_target_phase(e.phase);
        self.write_metrics(e.metrics);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`ReconcileEvent`].
    Reconcile(ReconcileEvent),
    /// A [`HookFailureEvent`].
    HookFailure(HookFailureEvent),
    /// A [`TargetEvent`].
    Target(TargetEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Iteration stops at the first truncated record or unknown tag.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_pass_result(&mut self) -> Option<PassResult> {
        Some(match self.read_u8()? {
            0 => PassResult::Incomplete,
            1 => PassResult::NoDrift,
            _ => PassResult::Corrected,
        })
    }

    fn read_hook_error(&mut self) -> Option<HookError> {
        let variant = self.read_u8()?;
        let kind = match self.read_u8()? {
            0 => HookKind::Detach,
            _ => HookKind::Attach,
        };
        Some(match variant {
            HOOK_UNAVAILABLE => HookError::Unavailable(kind),
            _ => HookError::Rejected(kind),
        })
    }

    fn read_target_phase(&mut self) -> Option<TargetPhase> {
        Some(match self.read_u8()? {
            0 => TargetPhase::Created,
            1 => TargetPhase::Shown,
            2 => TargetPhase::Superseded,
            3 => TargetPhase::Neutralized,
            4 => TargetPhase::Released,
            5 => TargetPhase::Removed,
            _ => TargetPhase::WaitCancelled,
        })
    }

    fn read_metrics(&mut self) -> Option<LayerMetrics> {
        Some(LayerMetrics::new(
            self.read_u32()?,
            self.read_u32()?,
            self.read_u32()?,
        ))
    }

    fn decode_reconcile(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reconcile(ReconcileEvent {
            pass: self.read_u64()?,
            surfaces: self.read_u32()?,
            result: self.read_pass_result()?,
            cycled: self.read_u32()?,
            skipped: self.read_u32()?,
        }))
    }

    fn decode_hook_failure(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::HookFailure(HookFailureEvent {
            pass: self.read_u64()?,
            position: self.read_u32()?,
            error: self.read_hook_error()?,
        }))
    }

    fn decode_target(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Target(TargetEvent {
            generation: self.read_u64()?,
            phase: self.read_target_phase()?,
            metrics: self.read_metrics()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_RECONCILE => self.decode_reconcile(),
            TAG_HOOK_FAILURE => self.decode_hook_failure(),
            TAG_TARGET => self.decode_target(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reconcile() -> ReconcileEvent {
        ReconcileEvent {
            pass: 4,
            surfaces: 3,
            result: PassResult::Corrected,
            cycled: 2,
            skipped: 1,
        }
    }

    fn sample_target(phase: TargetPhase) -> TargetEvent {
        TargetEvent {
            generation: 2,
            phase,
            metrics: LayerMetrics::new(1280, 720, 240),
        }
    }

    #[test]
    fn mixed_stream_decodes_in_order() {
        let mut rec = RecorderSink::new();
        let failure = HookFailureEvent {
            pass: 4,
            position: 1,
            error: HookError::Rejected(HookKind::Attach),
        };
        rec.on_hook_failure(&failure);
        rec.on_reconcile(&sample_reconcile());
        rec.on_target(&sample_target(TargetPhase::WaitCancelled));

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            vec![
                RecordedEvent::HookFailure(failure),
                RecordedEvent::Reconcile(sample_reconcile()),
                RecordedEvent::Target(sample_target(TargetPhase::WaitCancelled)),
            ]
        );
    }

    #[test]
    fn every_target_phase_survives_recording() {
        let phases = [
            TargetPhase::Created,
            TargetPhase::Shown,
            TargetPhase::Superseded,
            TargetPhase::Neutralized,
            TargetPhase::Released,
            TargetPhase::Removed,
            TargetPhase::WaitCancelled,
        ];
        let mut rec = RecorderSink::new();
        for phase in phases {
            rec.on_target(&sample_target(phase));
        }

        let decoded: Vec<TargetPhase> = decode(rec.as_bytes())
            .map(|e| match e {
                RecordedEvent::Target(t) => t.phase,
                other => panic!("expected Target, got {other:?}"),
            })
            .collect();
        assert_eq!(decoded, phases);
    }

    #[test]
    fn unavailable_hook_keeps_its_kind() {
        let mut rec = RecorderSink::new();
        rec.on_hook_failure(&HookFailureEvent {
            pass: 0,
            position: 7,
            error: HookError::Unavailable(HookKind::Detach),
        });
        match decode(rec.as_bytes()).next() {
            Some(RecordedEvent::HookFailure(e)) => {
                assert_eq!(e.error, HookError::Unavailable(HookKind::Detach));
                assert_eq!(e.position, 7);
            }
            other => panic!("expected HookFailure, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_reconcile(&sample_reconcile());
        rec.on_reconcile(&sample_reconcile());
        let bytes = rec.into_bytes();

        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_reconcile(&sample_reconcile());
        let mut bytes = rec.into_bytes();
        bytes.push(0xFF);
        bytes.extend_from_slice(&[0; 16]);

        assert_eq!(decode(&bytes).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
