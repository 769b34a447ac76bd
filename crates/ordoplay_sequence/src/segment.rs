// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track segments: spans of curves and point events.

use crate::curve::Curve;
use crate::value::{CurveKind, EventPayload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    /// Create a new random segment ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Which end of a curve segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentValue {
    /// First control point
    Begin,
    /// Last control point
    End,
}

/// A span of a curve track, one curve per value component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    /// Unique segment ID
    pub id: SegmentId,
    /// Start time in seconds
    pub start_time: f64,
    /// Duration in seconds, always positive
    pub duration: f64,
    /// Curves, one per component of the track's kind
    pub curves: Vec<Curve>,
}

impl CurveSegment {
    /// Create a segment whose curves are all flat at `value`
    pub fn flat(kind: CurveKind, start_time: f64, duration: f64, value: f32) -> Self {
        Self::with_curves(start_time, duration, vec![Curve::flat(value); kind.dimension()])
    }

    /// Create a segment from existing curves
    pub fn with_curves(start_time: f64, duration: f64, curves: Vec<Curve>) -> Self {
        Self {
            id: SegmentId::new(),
            start_time,
            duration,
            curves,
        }
    }

    /// End time in seconds
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether `time` falls strictly inside the segment
    pub fn strictly_contains(&self, time: f64) -> bool {
        self.start_time < time && time < self.end_time()
    }

    /// Local curve time of a sequence time, clamped to `[0, 1]`
    pub fn local_time(&self, time: f64) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        ((time - self.start_time) / self.duration).clamp(0.0, 1.0) as f32
    }

    /// Evaluate every curve at a sequence time
    pub fn evaluate(&self, time: f64) -> Vec<f32> {
        let local = self.local_time(time);
        self.curves.iter().map(|c| c.evaluate(local)).collect()
    }

    /// Start value of curve `curve_index`
    pub fn start_value(&self, curve_index: usize) -> Option<f32> {
        self.curves.get(curve_index).map(Curve::start_value)
    }

    /// End value of curve `curve_index`
    pub fn end_value(&self, curve_index: usize) -> Option<f32> {
        self.curves.get(curve_index).map(Curve::end_value)
    }
}

/// A point event on an event track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSegment {
    /// Unique segment ID
    pub id: SegmentId,
    /// Time the event fires, in seconds
    pub start_time: f64,
    /// Event payload
    pub payload: EventPayload,
}

impl EventSegment {
    /// Create a new event
    pub fn new(start_time: f64, payload: EventPayload) -> Self {
        Self {
            id: SegmentId::new(),
            start_time,
            payload,
        }
    }

    /// Events are instantaneous
    pub fn duration(&self) -> f64 {
        0.0
    }
}
