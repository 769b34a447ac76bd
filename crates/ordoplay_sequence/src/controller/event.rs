// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event track editing.

use super::SequenceController;
use crate::player::Player;
use crate::segment::{EventSegment, SegmentId};
use crate::track::{EventTrack, Track, TrackId};
use crate::value::{EventPayload, TrackFamily};
use std::sync::Arc;

/// Edits event tracks
pub struct EventController {
    player: Arc<Player>,
}

impl EventController {
    /// Create an event controller
    pub fn new(player: Arc<Player>) -> Self {
        Self { player }
    }

    fn edit<R>(
        &self,
        operation: &str,
        track_id: TrackId,
        edit: impl FnOnce(&mut EventTrack) -> Option<R>,
    ) -> Option<R> {
        let mut guard = self.player.lock();
        let result = guard
            .sequence_mut()
            .track_mut(track_id)
            .and_then(Track::as_event_mut)
            .and_then(edit);

        match result {
            Some(_) => guard.sequence_mut().recompute_duration(),
            None => tracing::debug!("Rejected {} on track {}", operation, track_id),
        }
        result
    }

    /// Add an event at `time`
    pub fn insert_event_segment(
        &self,
        track_id: TrackId,
        time: f64,
        payload: EventPayload,
    ) -> Option<SegmentId> {
        self.edit("event insert", track_id, |events| {
            if !(time.is_finite() && time >= 0.0) {
                return None;
            }
            let segment = EventSegment::new(time, payload);
            let id = segment.id;
            events.insert(segment);
            Some(id)
        })
    }

    /// Replace an event's payload
    pub fn edit_event_segment(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        payload: EventPayload,
    ) -> bool {
        self.edit("event edit", track_id, |events| {
            let index = events.segment_index(segment_id)?;
            events.segments[index].payload = payload;
            Some(())
        })
        .is_some()
    }

    /// Move an event to `time`
    pub fn segment_event_start_time_change(
        &self,
        track_id: TrackId,
        segment_id: SegmentId,
        time: f64,
    ) -> bool {
        self.edit("event move", track_id, |events| {
            if !(time.is_finite() && time >= 0.0) {
                return None;
            }
            let index = events.segment_index(segment_id)?;
            events.segments[index].start_time = time;
            events.sort();
            Some(())
        })
        .is_some()
    }
}

impl SequenceController for EventController {
    fn player(&self) -> &Player {
        &self.player
    }

    fn family(&self) -> TrackFamily {
        TrackFamily::Event
    }

    /// Adds an event with an empty text payload
    fn insert_segment(&self, track_id: TrackId, time: f64) -> Option<SegmentId> {
        self.insert_event_segment(track_id, time, EventPayload::Text(String::new()))
    }

    fn delete_segment(&self, track_id: TrackId, segment_id: SegmentId) -> bool {
        self.edit("event delete", track_id, |events| {
            let index = events.segment_index(segment_id)?;
            events.segments.remove(index);
            Some(())
        })
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::editor;

    fn times(editor: &crate::controller::SequenceEditor, track_id: TrackId) -> Vec<f64> {
        editor
            .player()
            .lock()
            .sequence()
            .track(track_id)
            .and_then(Track::as_event)
            .map(|events| events.segments.iter().map(|s| s.start_time).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_insert_and_move_events() {
        let editor = editor();
        let controller = editor.events();
        let track_id = controller.insert_track("Cues");

        let late = controller
            .insert_event_segment(track_id, 4.0, EventPayload::Text("late".into()))
            .unwrap();
        controller
            .insert_event_segment(track_id, 1.0, EventPayload::Int(1))
            .unwrap();
        assert_eq!(times(&editor, track_id), vec![1.0, 4.0]);
        assert_eq!(editor.player().duration(), 4.0);

        assert!(controller.segment_event_start_time_change(track_id, late, 0.5));
        assert_eq!(times(&editor, track_id), vec![0.5, 1.0]);
        assert_eq!(editor.player().duration(), 1.0);

        assert!(!controller.segment_event_start_time_change(track_id, late, -1.0));
        assert!(controller
            .insert_event_segment(track_id, -2.0, EventPayload::Int(0))
            .is_none());
    }

    #[test]
    fn test_edit_and_delete_event() {
        let editor = editor();
        let controller = editor.events();
        let track_id = controller.insert_track("Cues");
        let id = controller.insert_segment(track_id, 2.0).unwrap();

        assert!(controller.edit_event_segment(track_id, id, EventPayload::Vec2([1.0, 2.0])));
        let payload = editor
            .player()
            .lock()
            .sequence()
            .track(track_id)
            .and_then(Track::as_event)
            .map(|events| events.segments[0].payload.clone());
        assert_eq!(payload, Some(EventPayload::Vec2([1.0, 2.0])));

        assert!(controller.delete_segment(track_id, id));
        assert!(!controller.delete_segment(track_id, id));
        assert!(!controller.edit_event_segment(track_id, id, EventPayload::Int(3)));
        assert!(times(&editor, track_id).is_empty());
        assert_eq!(editor.player().duration(), 0.0);
    }
}
