// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence containing multiple tracks.

use crate::curve::CurveError;
use crate::segment::SegmentId;
use crate::track::{Track, TrackContent, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Tolerance for seams between segments, in seconds
pub const TIME_EPSILON: f64 = 1.0e-6;

/// Tolerance for value continuity across seams
pub const VALUE_EPSILON: f32 = 1.0e-4;

/// Unique identifier for a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub Uuid);

impl SequenceId {
    /// Create a new random sequence ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequenceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural defect found in a sequence
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructureError {
    /// A track is stored under another track's key
    #[error("track {0} is stored under a foreign key")]
    MisfiledTrack(TrackId),
    /// A segment ID appears more than once
    #[error("segment {0} appears more than once")]
    DuplicateSegment(SegmentId),
    /// A segment starts before zero
    #[error("segment {segment} on track {track} starts before zero")]
    NegativeStart {
        /// Owning track
        track: TrackId,
        /// Offending segment
        segment: SegmentId,
    },
    /// A curve segment has no positive duration
    #[error("segment {segment} on track {track} has non-positive duration")]
    NonPositiveDuration {
        /// Owning track
        track: TrackId,
        /// Offending segment
        segment: SegmentId,
    },
    /// Curve segments leave a gap or overlap
    #[error("segment {segment} on track {track} does not start where its predecessor ends")]
    Gap {
        /// Owning track
        track: TrackId,
        /// Offending segment
        segment: SegmentId,
    },
    /// A curve segment owns the wrong number of curves
    #[error("segment {segment} on track {track} has {found} curves, expected {expected}")]
    CurveCount {
        /// Owning track
        track: TrackId,
        /// Offending segment
        segment: SegmentId,
        /// Track dimension
        expected: usize,
        /// Curves present
        found: usize,
    },
    /// A curve is malformed
    #[error("curve {curve_index} of segment {segment}: {source}")]
    Curve {
        /// Offending segment
        segment: SegmentId,
        /// Curve index within the segment
        curve_index: usize,
        /// Curve defect
        source: CurveError,
    },
    /// End and start values disagree across a seam
    #[error("curve {curve_index} jumps at the start of segment {segment}")]
    Discontinuity {
        /// Segment after the seam
        segment: SegmentId,
        /// Curve index
        curve_index: usize,
    },
    /// Value range does not match the track kind
    #[error("value range of track {0} does not match its kind")]
    RangeKind(TrackId),
    /// Events are out of time order
    #[error("events of track {0} are not sorted")]
    UnsortedEvents(TrackId),
    /// Stored duration disagrees with the track content
    #[error("duration {found} does not match content duration {expected}")]
    Duration {
        /// Duration derived from the tracks
        expected: f64,
        /// Stored duration
        found: f64,
    },
}

/// A sequence of tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    /// Unique sequence ID
    pub id: SequenceId,
    /// Sequence name
    pub name: String,
    /// Tracks in this sequence
    tracks: IndexMap<TrackId, Track>,
    /// Sequence duration, the end of the longest track
    duration: f64,
}

impl Sequence {
    /// Create a new empty sequence
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SequenceId::new(),
            name: name.into(),
            tracks: IndexMap::new(),
            duration: 0.0,
        }
    }

    /// The empty fallback sequence used when a show fails to load
    pub fn empty() -> Self {
        Self::new("Empty Sequence")
    }

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        self.recompute_duration();
        id
    }

    /// Remove a track
    pub fn remove_track(&mut self, track_id: TrackId) -> Option<Track> {
        let removed = self.tracks.shift_remove(&track_id);
        if removed.is_some() {
            self.recompute_duration();
        }
        removed
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    /// Get all tracks
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Find the track owning a segment
    pub fn track_of_segment(&self, segment_id: SegmentId) -> Option<TrackId> {
        self.tracks
            .values()
            .find(|t| t.has_segment(segment_id))
            .map(|t| t.id)
    }

    /// Sequence duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Duration derived from the track content
    pub fn content_duration(&self) -> f64 {
        self.tracks.values().map(Track::end_time).fold(0.0, f64::max)
    }

    /// Re-derive the duration from the track content
    pub fn recompute_duration(&mut self) {
        self.duration = self.content_duration();
    }

    /// Check every structural invariant
    pub fn validate(&self) -> Result<(), StructureError> {
        let mut seen = HashSet::new();
        for (key, track) in &self.tracks {
            if *key != track.id {
                return Err(StructureError::MisfiledTrack(track.id));
            }
            match &track.content {
                TrackContent::Curve(curves) => {
                    if curves.minimum.kind() != curves.kind || curves.maximum.kind() != curves.kind {
                        return Err(StructureError::RangeKind(track.id));
                    }
                    let mut expected_start = 0.0;
                    for (index, segment) in curves.segments.iter().enumerate() {
                        if !seen.insert(segment.id) {
                            return Err(StructureError::DuplicateSegment(segment.id));
                        }
                        if segment.start_time < 0.0 {
                            return Err(StructureError::NegativeStart {
                                track: track.id,
                                segment: segment.id,
                            });
                        }
                        if segment.duration <= 0.0 {
                            return Err(StructureError::NonPositiveDuration {
                                track: track.id,
                                segment: segment.id,
                            });
                        }
                        if (segment.start_time - expected_start).abs() > TIME_EPSILON {
                            return Err(StructureError::Gap {
                                track: track.id,
                                segment: segment.id,
                            });
                        }
                        expected_start = segment.end_time();

                        let dimension = curves.kind.dimension();
                        if segment.curves.len() != dimension {
                            return Err(StructureError::CurveCount {
                                track: track.id,
                                segment: segment.id,
                                expected: dimension,
                                found: segment.curves.len(),
                            });
                        }
                        for (curve_index, curve) in segment.curves.iter().enumerate() {
                            curve.validate().map_err(|source| StructureError::Curve {
                                segment: segment.id,
                                curve_index,
                                source,
                            })?;
                        }

                        if index > 0 {
                            let previous = &curves.segments[index - 1];
                            for curve_index in 0..dimension {
                                let end = previous.curves[curve_index].end_value();
                                let start = segment.curves[curve_index].start_value();
                                if (end - start).abs() > VALUE_EPSILON {
                                    return Err(StructureError::Discontinuity {
                                        segment: segment.id,
                                        curve_index,
                                    });
                                }
                            }
                        }
                    }
                }
                TrackContent::Event(events) => {
                    let mut last = 0.0;
                    for segment in &events.segments {
                        if !seen.insert(segment.id) {
                            return Err(StructureError::DuplicateSegment(segment.id));
                        }
                        if segment.start_time < 0.0 {
                            return Err(StructureError::NegativeStart {
                                track: track.id,
                                segment: segment.id,
                            });
                        }
                        if segment.start_time < last {
                            return Err(StructureError::UnsortedEvents(track.id));
                        }
                        last = segment.start_time;
                    }
                }
            }
        }

        let expected = self.content_duration();
        if (expected - self.duration).abs() > TIME_EPSILON {
            return Err(StructureError::Duration {
                expected,
                found: self.duration,
            });
        }
        Ok(())
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Untitled Sequence")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{CurveSegment, EventSegment};
    use crate::value::{CurveKind, EventPayload};

    fn two_segment_track() -> Track {
        let mut track = Track::new_curve("Opacity", CurveKind::Float);
        if let Some(curves) = track.as_curve_mut() {
            curves.segments.push(CurveSegment::flat(CurveKind::Float, 0.0, 1.5, 0.2));
            curves.segments.push(CurveSegment::flat(CurveKind::Float, 1.5, 2.5, 0.2));
        }
        track
    }

    #[test]
    fn test_duration_tracks_longest_track() {
        let mut sequence = Sequence::default();
        assert_eq!(sequence.duration(), 0.0);

        let curve_id = sequence.add_track(two_segment_track());
        assert_eq!(sequence.duration(), 4.0);

        let mut events = Track::new_event("Cues");
        if let Some(list) = events.as_event_mut() {
            list.insert(EventSegment::new(6.0, EventPayload::Text("go".into())));
        }
        let event_id = sequence.add_track(events);
        assert_eq!(sequence.duration(), 6.0);

        sequence.remove_track(event_id);
        assert_eq!(sequence.duration(), 4.0);
        assert!(sequence.track(curve_id).is_some());
        assert!(sequence.validate().is_ok());
    }

    #[test]
    fn test_empty_sequence_is_valid() {
        let mut sequence = Sequence::empty();
        sequence.add_track(Track::new_curve("Empty", CurveKind::Vec2));
        assert_eq!(sequence.duration(), 0.0);
        assert!(sequence.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_gap() {
        let mut sequence = Sequence::default();
        let id = sequence.add_track(two_segment_track());
        if let Some(curves) = sequence.track_mut(id).and_then(Track::as_curve_mut) {
            curves.segments[1].start_time = 2.0;
        }
        assert!(matches!(sequence.validate(), Err(StructureError::Gap { .. })));
    }

    #[test]
    fn test_validate_reports_discontinuity() {
        let mut sequence = Sequence::default();
        let id = sequence.add_track(two_segment_track());
        if let Some(curves) = sequence.track_mut(id).and_then(Track::as_curve_mut) {
            curves.segments[1].curves[0].set_start_value(0.9);
        }
        assert!(matches!(
            sequence.validate(),
            Err(StructureError::Discontinuity { curve_index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_reports_stale_duration() {
        let mut sequence = Sequence::default();
        let id = sequence.add_track(two_segment_track());
        if let Some(curves) = sequence.track_mut(id).and_then(Track::as_curve_mut) {
            curves.segments[1].duration = 5.0;
        }
        assert!(matches!(sequence.validate(), Err(StructureError::Duration { .. })));
        sequence.recompute_duration();
        assert!(sequence.validate().is_ok());
    }

    #[test]
    fn test_track_of_segment() {
        let mut sequence = Sequence::default();
        let track = two_segment_track();
        let segment_id = track.as_curve().map(|c| c.segments[1].id);
        let id = sequence.add_track(track);
        assert_eq!(segment_id.and_then(|s| sequence.track_of_segment(s)), Some(id));
        assert_eq!(sequence.track_of_segment(SegmentId::new()), None);
    }
}
