// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve track editing.

use super::SequenceController;
use crate::curve::{Curve, InterpolationMode, TangentSide};
use crate::player::Player;
use crate::segment::{CurveSegment, SegmentId, SegmentValue};
use crate::sequence::TIME_EPSILON;
use crate::track::{CurveTrack, Track, TrackId};
use crate::value::{CurveKind, CurveValue, TrackFamily};
use std::sync::Arc;

/// Edits curve tracks of one kind
pub struct CurveController {
    player: Arc<Player>,
    kind: CurveKind,
}

impl CurveController {
    /// Create a controller for tracks of `kind`
    pub fn new(player: Arc<Player>, kind: CurveKind) -> Self {
        Self { player, kind }
    }

    /// Run `edit` on a curve track of this controller's kind under the gate.
    ///
    /// When the edit applies, segment times and seam values are restored and
    /// the sequence duration re-derived before the gate is released.
    fn edit<R>(
        &self,
        operation: &str,
        track_id: TrackId,
        edit: impl FnOnce(&mut CurveTrack) -> Option<R>,
    ) -> Option<R> {
        let mut guard = self.player.lock();
        let result = guard
            .sequence_mut()
            .track_mut(track_id)
            .and_then(Track::as_curve_mut)
            .filter(|curves| curves.kind == self.kind)
            .and_then(|curves| {
                let result = edit(&mut *curves)?;
                curves.restore_continuity();
                Some(result)
            });

        match result {
            Some(_) => guard.sequence_mut().recompute_duration(),
            None => tracing::debug!("Rejected {} on track {}", operation, track_id),
        }
        result
    }

    /// Run `edit` on one curve of one segment
    fn edit_curve<R>(
        &self,
        operation: &str,
        track_id: TrackId,
        segment_id: SegmentId,
        curve_index: usize,
        edit: impl FnOnce(&mut Curve) -> Option<R>,
    ) -> Option<R> {
        self.edit(operation, track_id, |curves| {
            let index = curves.segment_index(segment_id)?;
            edit(curves.segments[index].curves.get_mut(curve_index)?)
        })
    }

    /// Change a segment's duration by `delta`. Later segments move with it.
    pub fn segment_duration_change(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        delta: f64,
    ) -> bool {
        self.edit("duration change", track_id, |curves| {
            let index = curves.segment_index(segment_id)?;
            let segment = &mut curves.segments[index];
            let duration = segment.duration + delta;
            if !(duration.is_finite() && duration > TIME_EPSILON) {
                return None;
            }
            segment.duration = duration;
            Some(())
        })
        .is_some()
    }

    /// Re-derive start times and seam values of a track
    pub fn update_curve_segments(&self, track_id: TrackId) -> bool {
        self.edit("segment update", track_id, |_| Some(())).is_some()
    }

    /// Insert a point on a curve at local time `pos`, returning its index
    pub fn insert_curve_point(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        curve_index: usize,
        pos: f32,
    ) -> Option<usize> {
        self.edit_curve("point insert", track_id, segment_id, curve_index, |curve| {
            curve.insert_point(pos)
        })
    }

    /// Delete an interior point of a curve
    pub fn delete_curve_point(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        curve_index: usize,
        point_index: usize,
    ) -> bool {
        self.edit_curve("point delete", track_id, segment_id, curve_index, |curve| {
            curve.remove_point(point_index).then_some(())
        })
        .is_some()
    }

    /// Shift a point's local time and value
    pub fn change_curve_point(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        curve_index: usize,
        point_index: usize,
        delta_time: f32,
        delta_value: f32,
    ) -> bool {
        self.edit_curve("point change", track_id, segment_id, curve_index, |curve| {
            curve
                .move_point(point_index, delta_time, delta_value)
                .then_some(())
        })
        .is_some()
    }

    /// Shift one tangent of a point. Editing the last point of a segment also
    /// writes its tangents onto the first point of the next segment.
    pub fn change_tangent(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        curve_index: usize,
        point_index: usize,
        side: TangentSide,
        delta_time: f32,
        delta_value: f32,
    ) -> bool {
        self.edit("tangent change", track_id, |curves| {
            let index = curves.segment_index(segment_id)?;
            let curve = curves.segments[index].curves.get_mut(curve_index)?;
            if !curve.change_tangent(point_index, side, delta_time, delta_value) {
                return None;
            }

            if point_index + 1 == curve.point_count() {
                let point = curve.points()[point_index];
                if let Some(next) = curves
                    .segments
                    .get_mut(index + 1)
                    .and_then(|s| s.curves.get_mut(curve_index))
                {
                    next.set_tangents(0, point.in_tangent, point.out_tangent);
                }
            }
            Some(())
        })
        .is_some()
    }

    /// Shift the first or last value of a segment's curve. The first value of
    /// a segment with a predecessor is the shared seam, so the predecessor's
    /// end value moves with it.
    pub fn change_curve_segment_value(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        curve_index: usize,
        delta_value: f32,
        which: SegmentValue,
    ) -> bool {
        self.edit("value change", track_id, |curves| {
            if !delta_value.is_finite() {
                return None;
            }
            let index = curves.segment_index(segment_id)?;
            match which {
                SegmentValue::End => {
                    let curve = curves.segments[index].curves.get_mut(curve_index)?;
                    curve.set_end_value(curve.end_value() + delta_value);
                }
                SegmentValue::Begin if index > 0 => {
                    let curve = curves.segments[index - 1].curves.get_mut(curve_index)?;
                    curve.set_end_value(curve.end_value() + delta_value);
                }
                SegmentValue::Begin => {
                    let curve = curves.segments[index].curves.get_mut(curve_index)?;
                    curve.set_start_value(curve.start_value() + delta_value);
                }
            }
            Some(())
        })
        .is_some()
    }

    /// Switch every span of a curve to `mode`
    pub fn change_curve_type(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        curve_index: usize,
        mode: InterpolationMode,
    ) -> bool {
        self.edit_curve("curve type change", track_id, segment_id, curve_index, |curve| {
            curve.set_interpolation(mode);
            Some(())
        })
        .is_some()
    }

    /// Set the values normalized `0` and `1` map to
    pub fn change_min_max(
        &self,
        track_id: TrackId,
        minimum: CurveValue,
        maximum: CurveValue,
    ) -> bool {
        let kind = self.kind;
        self.edit("range change", track_id, |curves| {
            if minimum.kind() != kind || maximum.kind() != kind {
                return None;
            }
            curves.minimum = minimum;
            curves.maximum = maximum;
            Some(())
        })
        .is_some()
    }
}

/// Split the segment covering `time`, or append one ending at `time`
fn insert_segment(curves: &mut CurveTrack, time: f64) -> Option<SegmentId> {
    if !(time.is_finite() && time > TIME_EPSILON) {
        return None;
    }

    if curves.segments.is_empty() {
        let segment = CurveSegment::flat(curves.kind, 0.0, time, 0.0);
        let id = segment.id;
        curves.segments.push(segment);
        return Some(id);
    }

    let end = curves.end_time();
    if time >= end {
        if time - end <= TIME_EPSILON {
            return None;
        }
        let last = curves.segments.last()?;
        let flat = last.curves.iter().map(|c| Curve::flat(c.end_value())).collect();
        let segment = CurveSegment::with_curves(end, time - end, flat);
        let id = segment.id;
        curves.segments.push(segment);
        return Some(id);
    }

    let index = curves.segments.iter().position(|s| {
        s.start_time + TIME_EPSILON < time && time < s.end_time() - TIME_EPSILON
    })?;
    let segment = &curves.segments[index];
    let local = segment.local_time(time);
    let halves: Vec<(Curve, Curve)> = segment
        .curves
        .iter()
        .map(|curve| curve.split_at(local))
        .collect::<Option<_>>()?;

    let (left, right): (Vec<Curve>, Vec<Curve>) = halves.into_iter().unzip();
    let split = CurveSegment::with_curves(time, segment.end_time() - time, right);
    let id = split.id;

    let segment = &mut curves.segments[index];
    segment.duration = time - segment.start_time;
    segment.curves = left;
    curves.segments.insert(index + 1, split);
    Some(id)
}

/// Remove a segment. Its neighbour (the preceding one, else the following
/// one) absorbs its time span and its curve shape.
fn delete_segment(curves: &mut CurveTrack, segment_id: SegmentId) -> Option<()> {
    let index = curves.segment_index(segment_id)?;
    let removed = curves.segments.remove(index);
    if curves.segments.is_empty() {
        return Some(());
    }

    let total = |other: f64| other + removed.duration;
    if index > 0 {
        let previous = &mut curves.segments[index - 1];
        let ratio = (previous.duration / total(previous.duration)) as f32;
        previous.curves = previous
            .curves
            .iter()
            .zip(&removed.curves)
            .map(|(left, right)| Curve::join(left, right, ratio))
            .collect();
        previous.duration = total(previous.duration);
    } else {
        let next = &mut curves.segments[0];
        let ratio = (removed.duration / total(next.duration)) as f32;
        next.curves = removed
            .curves
            .iter()
            .zip(&next.curves)
            .map(|(left, right)| Curve::join(left, right, ratio))
            .collect();
        next.duration = total(next.duration);
    }
    Some(())
}

impl SequenceController for CurveController {
    fn player(&self) -> &Player {
        &self.player
    }

    fn family(&self) -> TrackFamily {
        TrackFamily::Curve(self.kind)
    }

    fn insert_segment(&self, track_id: TrackId, time: f64) -> Option<SegmentId> {
        self.edit("segment insert", track_id, |curves| {
            insert_segment(curves, time)
        })
    }

    fn delete_segment(&self, track_id: TrackId, segment_id: SegmentId) -> bool {
        self.edit("segment delete", track_id, |curves| {
            delete_segment(curves, segment_id)
        })
        .is_some()
    }
}
