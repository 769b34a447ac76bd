// SPDX-License-Identifier: MIT OR Apache-2.0
//! Controllers: the mutation surface over the player's sequence.
//!
//! Each controller serves one track family and takes the player's gate for
//! the full duration of every operation. Invalid requests are rejected
//! without touching the sequence; operations report whether they applied.

mod curve;
mod event;

pub use curve::CurveController;
pub use event::EventController;

use crate::player::Player;
use crate::segment::SegmentId;
use crate::track::{Track, TrackId};
use crate::value::{CurveKind, TrackFamily};
use std::sync::Arc;

/// Operations shared by every track family
pub trait SequenceController: Send + Sync {
    /// The player whose sequence this controller edits
    fn player(&self) -> &Player;

    /// Family of the tracks this controller edits
    fn family(&self) -> TrackFamily;

    /// Insert a segment into a track at `time`
    fn insert_segment(&self, track_id: TrackId, time: f64) -> Option<SegmentId>;

    /// Delete a segment from a track
    fn delete_segment(&self, track_id: TrackId, segment_id: SegmentId) -> bool;

    /// Append an empty track of this controller's family
    fn insert_track(&self, name: &str) -> TrackId {
        let track = match self.family() {
            TrackFamily::Curve(kind) => Track::new_curve(name, kind),
            TrackFamily::Event => Track::new_event(name),
        };
        let id = self.player().lock().sequence_mut().add_track(track);
        tracing::debug!("Inserted {} track {}", self.family().name(), id);
        id
    }

    /// Remove a track, its segments and its adapter
    fn delete_track(&self, track_id: TrackId) -> bool {
        let mut guard = self.player().lock();
        guard.unbind_track(track_id);
        guard.sequence_mut().remove_track(track_id).is_some()
    }

    /// Bind a track to a sink. An empty binding unbinds the track. The binding
    /// is only stored once an adapter could be built for it.
    fn assign_binding(&self, track_id: TrackId, binding: &str) -> bool {
        let mut guard = self.player().lock();
        if guard.sequence().track(track_id).is_none() {
            return false;
        }

        if binding.is_empty() {
            guard.unbind_track(track_id);
            if let Some(track) = guard.sequence_mut().track_mut(track_id) {
                track.binding = None;
            }
            return true;
        }

        match guard.bind_track(track_id, binding) {
            Ok(()) => {
                if let Some(track) = guard.sequence_mut().track_mut(track_id) {
                    track.binding = Some(binding.to_string());
                }
                true
            }
            Err(e) => {
                tracing::warn!("Cannot bind track {}: {}", track_id, e);
                false
            }
        }
    }

    /// Rename a track
    fn rename_track(&self, track_id: TrackId, name: &str) -> bool {
        let mut guard = self.player().lock();
        match guard.sequence_mut().track_mut(track_id) {
            Some(track) => {
                track.name = name.to_string();
                true
            }
            None => false,
        }
    }
}

const CURVE_KINDS: [CurveKind; 4] = [
    CurveKind::Float,
    CurveKind::Vec2,
    CurveKind::Vec3,
    CurveKind::Vec4,
];

/// Registration table holding one controller per track family
pub struct SequenceEditor {
    player: Arc<Player>,
    curves: Vec<CurveController>,
    events: EventController,
}

impl SequenceEditor {
    /// Register the controllers of every family over `player`
    pub fn new(player: Arc<Player>) -> Self {
        let curves = CURVE_KINDS
            .iter()
            .map(|kind| CurveController::new(Arc::clone(&player), *kind))
            .collect();
        let events = EventController::new(Arc::clone(&player));
        Self {
            player,
            curves,
            events,
        }
    }

    /// The edited player
    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    /// Controller for curve tracks of `kind`
    pub fn curve(&self, kind: CurveKind) -> &CurveController {
        let index = CURVE_KINDS.iter().position(|k| *k == kind).unwrap_or(0);
        &self.curves[index]
    }

    /// Controller for event tracks
    pub fn events(&self) -> &EventController {
        &self.events
    }

    /// Controller for a track family
    pub fn controller(&self, family: TrackFamily) -> &dyn SequenceController {
        match family {
            TrackFamily::Curve(kind) => self.curve(kind) as &dyn SequenceController,
            TrackFamily::Event => &self.events,
        }
    }

    /// Controller for the family of an existing track
    pub fn controller_for_track(&self, track_id: TrackId) -> Option<&dyn SequenceController> {
        let family = self.player.lock().sequence().track(track_id)?.family();
        Some(self.controller(family))
    }

    /// Every registered controller
    pub fn controllers(&self) -> impl Iterator<Item = &dyn SequenceController> {
        self.curves
            .iter()
            .map(|c| c as &dyn SequenceController)
            .chain(std::iter::once(&self.events as &dyn SequenceController))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::binding::{BindingRegistry, EventQueue, ValueSlot};
    use crate::config::{ClockMode, PlayerConfig};

    pub(crate) fn editor() -> SequenceEditor {
        let registry = Arc::new(BindingRegistry::new());
        registry.register_value("slot.float", Arc::new(ValueSlot::new(CurveKind::Float)));
        registry.register_event("events", Arc::new(EventQueue::new()));
        let config = PlayerConfig {
            clock: ClockMode::Manual,
            ..PlayerConfig::default()
        };
        SequenceEditor::new(Arc::new(Player::from_config(config, registry)))
    }

    #[test]
    fn test_controller_lookup_by_family() {
        let editor = editor();
        assert_eq!(editor.controllers().count(), 5);
        for family in [
            TrackFamily::Curve(CurveKind::Vec3),
            TrackFamily::Curve(CurveKind::Float),
            TrackFamily::Event,
        ] {
            assert_eq!(editor.controller(family).family(), family);
        }

        let track_id = editor.curve(CurveKind::Vec2).insert_track("Offset");
        let controller = editor.controller_for_track(track_id).unwrap();
        assert_eq!(controller.family(), TrackFamily::Curve(CurveKind::Vec2));
        assert!(editor.controller_for_track(TrackId::new()).is_none());
    }

    #[test]
    fn test_assign_binding() {
        let editor = editor();
        let controller = editor.curve(CurveKind::Float);
        let track_id = controller.insert_track("Fade");

        assert!(!controller.assign_binding(track_id, "events"));
        assert!(!controller.assign_binding(track_id, "missing"));
        assert_eq!(editor.player().lock().adapter_count(), 0);

        assert!(controller.assign_binding(track_id, "slot.float"));
        {
            let guard = editor.player().lock();
            assert!(guard.adapter(track_id).is_some());
            assert_eq!(guard.sequence().track(track_id).unwrap().binding(), Some("slot.float"));
        }

        assert!(!controller.assign_binding(track_id, "missing"));
        assert!(editor.player().lock().adapter(track_id).is_some());

        assert!(controller.assign_binding(track_id, ""));
        let guard = editor.player().lock();
        assert!(guard.adapter(track_id).is_none());
        assert_eq!(guard.sequence().track(track_id).unwrap().binding(), None);
    }

    #[test]
    fn test_delete_track_drops_adapter() {
        let editor = editor();
        let controller = editor.events();
        let track_id = controller.insert_track("Cues");
        controller.insert_event_segment(track_id, 3.0, crate::value::EventPayload::Int(1));
        assert!(controller.assign_binding(track_id, "events"));
        assert_eq!(editor.player().duration(), 3.0);

        assert!(controller.delete_track(track_id));
        assert!(!controller.delete_track(track_id));
        let guard = editor.player().lock();
        assert_eq!(guard.adapter_count(), 0);
        assert_eq!(guard.sequence().track_count(), 0);
        assert_eq!(guard.sequence().duration(), 0.0);
    }

    #[test]
    fn test_rename_track() {
        let editor = editor();
        let controller = editor.events();
        let track_id = controller.insert_track("Cues");
        assert!(controller.rename_track(track_id, "Lighting cues"));
        assert!(!controller.rename_track(TrackId::new(), "Nothing"));
        assert_eq!(
            editor.player().lock().sequence().track(track_id).unwrap().name,
            "Lighting cues"
        );
    }
}
