// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the sequence.

use crate::segment::{CurveSegment, EventSegment, SegmentId};
use crate::value::{CurveKind, CurveValue, TrackFamily};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A track in the sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Identifier of the external sink this track drives
    pub binding: Option<String>,
    /// Segments of this track
    pub content: TrackContent,
}

/// Segments of a track, by family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackContent {
    /// Contiguous curve segments
    Curve(CurveTrack),
    /// Point events
    Event(EventTrack),
}

impl Track {
    /// Create an empty curve track
    pub fn new_curve(name: impl Into<String>, kind: CurveKind) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            binding: None,
            content: TrackContent::Curve(CurveTrack::new(kind)),
        }
    }

    /// Create an empty event track
    pub fn new_event(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            binding: None,
            content: TrackContent::Event(EventTrack::default()),
        }
    }

    /// Family of this track
    pub fn family(&self) -> TrackFamily {
        match &self.content {
            TrackContent::Curve(curve) => TrackFamily::Curve(curve.kind),
            TrackContent::Event(_) => TrackFamily::Event,
        }
    }

    /// The binding identifier, if bound to a non-empty one
    pub fn binding(&self) -> Option<&str> {
        self.binding.as_deref().filter(|b| !b.is_empty())
    }

    /// Time at which the track's content ends
    pub fn end_time(&self) -> f64 {
        match &self.content {
            TrackContent::Curve(curve) => curve.end_time(),
            TrackContent::Event(events) => events.end_time(),
        }
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        match &self.content {
            TrackContent::Curve(curve) => curve.segments.len(),
            TrackContent::Event(events) => events.segments.len(),
        }
    }

    /// Whether the track holds a segment with this ID
    pub fn has_segment(&self, segment_id: SegmentId) -> bool {
        match &self.content {
            TrackContent::Curve(curve) => curve.segment_index(segment_id).is_some(),
            TrackContent::Event(events) => events.segment_index(segment_id).is_some(),
        }
    }

    /// Curve content, if this is a curve track
    pub fn as_curve(&self) -> Option<&CurveTrack> {
        match &self.content {
            TrackContent::Curve(curve) => Some(curve),
            TrackContent::Event(_) => None,
        }
    }

    /// Mutable curve content, if this is a curve track
    pub fn as_curve_mut(&mut self) -> Option<&mut CurveTrack> {
        match &mut self.content {
            TrackContent::Curve(curve) => Some(curve),
            TrackContent::Event(_) => None,
        }
    }

    /// Event content, if this is an event track
    pub fn as_event(&self) -> Option<&EventTrack> {
        match &self.content {
            TrackContent::Event(events) => Some(events),
            TrackContent::Curve(_) => None,
        }
    }

    /// Mutable event content, if this is an event track
    pub fn as_event_mut(&mut self) -> Option<&mut EventTrack> {
        match &mut self.content {
            TrackContent::Event(events) => Some(events),
            TrackContent::Curve(_) => None,
        }
    }
}

/// Curve content of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveTrack {
    /// Value kind
    pub kind: CurveKind,
    /// Value a normalized `0` maps to
    pub minimum: CurveValue,
    /// Value a normalized `1` maps to
    pub maximum: CurveValue,
    /// Contiguous segments, sorted by start time
    pub segments: Vec<CurveSegment>,
}

impl CurveTrack {
    /// Create an empty curve track mapping to `[0, 1]`
    pub fn new(kind: CurveKind) -> Self {
        Self {
            kind,
            minimum: CurveValue::zero(kind),
            maximum: CurveValue::one(kind),
            segments: Vec::new(),
        }
    }

    /// End of the last segment
    pub fn end_time(&self) -> f64 {
        self.segments.last().map_or(0.0, CurveSegment::end_time)
    }

    /// Index of a segment
    pub fn segment_index(&self, segment_id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == segment_id)
    }

    /// The segment covering `time`. Times before the track read the first
    /// segment, times past it the last one.
    pub fn segment_at(&self, time: f64) -> Option<&CurveSegment> {
        let index = self.segments.partition_point(|s| s.end_time() <= time);
        self.segments
            .get(index)
            .or_else(|| self.segments.last())
    }

    /// Normalized value of every curve at `time`
    pub fn evaluate(&self, time: f64) -> Option<Vec<f32>> {
        self.segment_at(time).map(|segment| segment.evaluate(time))
    }

    /// Track value at `time`, mapped into `[minimum, maximum]`
    pub fn sample(&self, time: f64) -> Option<CurveValue> {
        let normalized = self.evaluate(time)?;
        Some(self.denormalize(&normalized))
    }

    /// Map normalized components into the track's value range
    pub fn denormalize(&self, normalized: &[f32]) -> CurveValue {
        let min = self.minimum.components();
        let max = self.maximum.components();
        let mapped: Vec<f32> = normalized
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let lo = min.get(i).copied().unwrap_or(0.0);
                let hi = max.get(i).copied().unwrap_or(1.0);
                lo + v * (hi - lo)
            })
            .collect();
        CurveValue::from_components(self.kind, &mapped)
    }

    /// Re-derive start times from the cumulative durations and copy every
    /// segment's end values onto the start of the next segment.
    pub fn restore_continuity(&mut self) {
        let mut start = 0.0;
        for segment in &mut self.segments {
            segment.start_time = start;
            start += segment.duration;
        }

        for i in 1..self.segments.len() {
            let (before, after) = self.segments.split_at_mut(i);
            let previous = &before[i - 1];
            let current = &mut after[0];
            for (curve, previous_curve) in current.curves.iter_mut().zip(&previous.curves) {
                curve.set_start_value(previous_curve.end_value());
            }
        }
    }
}

/// Event content of a track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTrack {
    /// Events, sorted by start time
    pub segments: Vec<EventSegment>,
}

impl EventTrack {
    /// Time of the last event
    pub fn end_time(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.start_time)
    }

    /// Index of an event
    pub fn segment_index(&self, segment_id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == segment_id)
    }

    /// Add an event, keeping the list sorted
    pub fn insert(&mut self, segment: EventSegment) {
        let index = self
            .segments
            .partition_point(|s| s.start_time <= segment.start_time);
        self.segments.insert(index, segment);
    }

    /// Restore time order after an edit
    pub fn sort(&mut self) {
        self.segments
            .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }

    /// Events with `start < time < end`, the bounds included on request
    pub fn events_between(
        &self,
        start: f64,
        end: f64,
        include_start: bool,
        include_end: bool,
    ) -> impl Iterator<Item = &EventSegment> {
        self.segments.iter().filter(move |s| {
            let t = s.start_time;
            let after_start = t > start || (include_start && t == start);
            let before_end = t < end || (include_end && t == end);
            after_start && before_end
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::EventPayload;

    fn ramp_track() -> CurveTrack {
        let mut track = CurveTrack::new(CurveKind::Float);
        let mut first = CurveSegment::flat(CurveKind::Float, 0.0, 2.0, 0.0);
        first.curves[0].set_end_value(1.0);
        let second = CurveSegment::flat(CurveKind::Float, 2.0, 2.0, 0.5);
        track.segments = vec![first, second];
        track
    }

    #[test]
    fn test_segment_lookup() {
        let track = ramp_track();
        assert_eq!(track.segment_at(0.0).map(|s| s.start_time), Some(0.0));
        assert_eq!(track.segment_at(1.9).map(|s| s.start_time), Some(0.0));
        assert_eq!(track.segment_at(2.0).map(|s| s.start_time), Some(2.0));
        assert_eq!(track.segment_at(9.0).map(|s| s.start_time), Some(2.0));
        assert!(CurveTrack::new(CurveKind::Float).segment_at(1.0).is_none());
    }

    #[test]
    fn test_sample_maps_into_range() {
        let mut track = ramp_track();
        track.minimum = CurveValue::Float(-10.0);
        track.maximum = CurveValue::Float(10.0);
        assert_eq!(track.sample(0.0), Some(CurveValue::Float(-10.0)));
        assert_eq!(track.sample(1.0), Some(CurveValue::Float(0.0)));
    }

    #[test]
    fn test_restore_continuity() {
        let mut track = ramp_track();
        track.segments[1].start_time = 7.0;
        track.restore_continuity();
        assert_eq!(track.segments[1].start_time, 2.0);
        assert_eq!(track.segments[1].curves[0].start_value(), 1.0);
        assert_eq!(track.segments[1].curves[0].end_value(), 0.5);
    }

    #[test]
    fn test_events_stay_sorted() {
        let mut events = EventTrack::default();
        events.insert(EventSegment::new(3.0, EventPayload::Int(3)));
        events.insert(EventSegment::new(1.0, EventPayload::Int(1)));
        events.insert(EventSegment::new(2.0, EventPayload::Int(2)));
        let times: Vec<f64> = events.segments.iter().map(|s| s.start_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert_eq!(events.end_time(), 3.0);

        assert_eq!(events.events_between(1.0, 3.0, false, true).count(), 2);
        assert_eq!(events.events_between(1.0, 3.0, true, false).count(), 2);
        assert_eq!(events.events_between(1.0, 3.0, true, true).count(), 3);
    }

    #[test]
    fn test_family_and_binding() {
        let mut track = Track::new_curve("Position", CurveKind::Vec3);
        assert_eq!(track.family(), TrackFamily::Curve(CurveKind::Vec3));
        assert_eq!(track.binding(), None);
        track.binding = Some(String::new());
        assert_eq!(track.binding(), None);
        track.binding = Some("camera.position".into());
        assert_eq!(track.binding(), Some("camera.position"));
        assert_eq!(Track::new_event("Cues").family(), TrackFamily::Event);
    }
}
