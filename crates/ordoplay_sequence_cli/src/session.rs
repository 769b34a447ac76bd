// SPDX-License-Identifier: MIT OR Apache-2.0
//! Console session: runs parsed commands against a player.

use crate::commands::{Command, CommandError, HELP};
use ordoplay_sequence::{
    BindingRegistry, ClockMode, CurveKind, EventPayload, EventQueue, Player, PlayerConfig, SegmentId,
    SequenceController, SequenceEditor, TrackContent, TrackId, ValueSlot,
};
use std::io::Write;
use std::sync::Arc;

/// Binding of the event queue every session registers
pub const EVENT_SINK: &str = "events";

/// Whether the console keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Leave the console
    Quit,
}

/// A player, its controllers and the sinks the console owns
pub struct Session {
    editor: SequenceEditor,
    slots: Vec<(String, Arc<ValueSlot>)>,
    events: Arc<EventQueue>,
}

impl Session {
    /// Build the sink registry and the player from `config`
    pub fn new(config: PlayerConfig) -> Self {
        let registry = Arc::new(BindingRegistry::new());
        let slots: Vec<(String, Arc<ValueSlot>)> = [
            CurveKind::Float,
            CurveKind::Vec2,
            CurveKind::Vec3,
            CurveKind::Vec4,
        ]
        .into_iter()
        .map(|kind| {
            let id = format!("slot.{}", kind.name().to_ascii_lowercase());
            let slot = Arc::new(ValueSlot::new(kind));
            registry.register_value(id.clone(), slot.clone());
            (id, slot)
        })
        .collect();
        let events = Arc::new(EventQueue::new());
        registry.register_event(EVENT_SINK, events.clone());

        let player = Arc::new(Player::from_config(config, registry));
        Self {
            editor: SequenceEditor::new(player),
            slots,
            events,
        }
    }

    /// The session's player
    pub fn player(&self) -> &Arc<Player> {
        self.editor.player()
    }

    fn track_id(&self, position: usize) -> Result<TrackId, CommandError> {
        let guard = self.player().lock();
        position
            .checked_sub(1)
            .and_then(|i| guard.sequence().tracks().nth(i))
            .map(|t| t.id)
            .ok_or(CommandError::NoTrack(position))
    }

    fn segment_id(&self, track_id: TrackId, position: usize) -> Result<SegmentId, CommandError> {
        let guard = self.player().lock();
        let index = position.checked_sub(1).ok_or(CommandError::NoSegment(position))?;
        let segment = match guard.sequence().track(track_id).map(|t| &t.content) {
            Some(TrackContent::Curve(curves)) => curves.segments.get(index).map(|s| s.id),
            Some(TrackContent::Event(events)) => events.segments.get(index).map(|s| s.id),
            None => None,
        };
        segment.ok_or(CommandError::NoSegment(position))
    }

    fn controller(&self, track_id: TrackId) -> Result<&dyn SequenceController, CommandError> {
        self.editor
            .controller_for_track(track_id)
            .ok_or(CommandError::Rejected("track disappeared"))
    }

    fn check(applied: bool, what: &'static str) -> Result<(), CommandError> {
        if applied {
            Ok(())
        } else {
            Err(CommandError::Rejected(what))
        }
    }

    /// Run one command, writing its output to `out`
    pub fn execute(&self, command: Command, out: &mut impl Write) -> Result<Flow, CommandError> {
        let player = self.player();
        match command {
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Play => player.play(),
            Command::Stop => player.stop(),
            Command::Pause => player.pause(),
            Command::Unpause => player.unpause(),
            Command::Loop(looping) => player.set_looping(looping),
            Command::Speed(speed) => player.set_speed(speed),
            Command::Seek(time) => player.set_time(time),
            Command::Tick(seconds) => {
                if player.config().clock != ClockMode::Manual {
                    return Err(CommandError::Rejected("tick needs the manual clock"));
                }
                if !(seconds.is_finite() && seconds >= 0.0) {
                    return Err(CommandError::Usage("tick <seconds>"));
                }
                player.update(std::time::Duration::from_secs_f64(seconds));
            }
            Command::Status => {
                let transport = player.transport();
                writeln!(
                    out,
                    "time {:.3}/{:.3}  playing {}  paused {}  loop {}  speed {}",
                    transport.time,
                    player.duration(),
                    transport.playing,
                    transport.paused,
                    transport.looping,
                    transport.speed
                )?;
            }
            Command::Load(name) => {
                let outcome = player.load(&name)?;
                writeln!(out, "{outcome:?}")?;
            }
            Command::Save(name) => player.save(&name)?,
            Command::NewTrack(family, name) => {
                let id = self.editor.controller(family).insert_track(&name);
                writeln!(out, "track {id}")?;
            }
            Command::DeleteTrack(position) => {
                let track_id = self.track_id(position)?;
                Self::check(self.controller(track_id)?.delete_track(track_id), "delete track")?;
            }
            Command::Rename(position, name) => {
                let track_id = self.track_id(position)?;
                Self::check(self.controller(track_id)?.rename_track(track_id, &name), "rename")?;
            }
            Command::InsertSegment(position, time) => {
                let track_id = self.track_id(position)?;
                let id = self
                    .controller(track_id)?
                    .insert_segment(track_id, time)
                    .ok_or(CommandError::Rejected("insert segment"))?;
                writeln!(out, "segment {id}")?;
            }
            Command::DeleteSegment(track, segment) => {
                let track_id = self.track_id(track)?;
                let segment_id = self.segment_id(track_id, segment)?;
                Self::check(
                    self.controller(track_id)?.delete_segment(track_id, segment_id),
                    "delete segment",
                )?;
            }
            Command::Event(position, time, text) => {
                let track_id = self.track_id(position)?;
                self.editor
                    .events()
                    .insert_event_segment(track_id, time, EventPayload::Text(text))
                    .ok_or(CommandError::Rejected("insert event"))?;
            }
            Command::Duration(track, segment, delta) => {
                let track_id = self.track_id(track)?;
                let segment_id = self.segment_id(track_id, segment)?;
                let kind = self.curve_kind(track_id)?;
                Self::check(
                    self.editor
                        .curve(kind)
                        .segment_duration_change(track_id, segment_id, delta),
                    "duration change",
                )?;
            }
            Command::Value(track, segment, curve, which, delta) => {
                let track_id = self.track_id(track)?;
                let segment_id = self.segment_id(track_id, segment)?;
                let kind = self.curve_kind(track_id)?;
                Self::check(
                    self.editor.curve(kind).change_curve_segment_value(
                        track_id, segment_id, curve, delta, which,
                    ),
                    "value change",
                )?;
            }
            Command::Bind(position, binding) => {
                let track_id = self.track_id(position)?;
                Self::check(
                    self.controller(track_id)?.assign_binding(track_id, &binding),
                    "bind",
                )?;
            }
            Command::Unbind(position) => {
                let track_id = self.track_id(position)?;
                Self::check(self.controller(track_id)?.assign_binding(track_id, ""), "unbind")?;
            }
            Command::List => self.list(out)?,
            Command::Sinks => {
                for (id, accepts) in player.registry().entries() {
                    writeln!(out, "{id}: {accepts}")?;
                }
            }
            Command::Poll => {
                for (id, slot) in &self.slots {
                    if let Some(value) = slot.take() {
                        writeln!(out, "{id} = {:?}", value.components())?;
                    }
                }
                for payload in self.events.drain() {
                    writeln!(out, "{EVENT_SINK} <- {payload}")?;
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn curve_kind(&self, track_id: TrackId) -> Result<CurveKind, CommandError> {
        let guard = self.player().lock();
        guard
            .sequence()
            .track(track_id)
            .and_then(|t| t.as_curve())
            .map(|c| c.kind)
            .ok_or(CommandError::Rejected("not a curve track"))
    }

    fn list(&self, out: &mut impl Write) -> Result<(), CommandError> {
        let guard = self.player().lock();
        for (i, track) in guard.sequence().tracks().enumerate() {
            let bound = if guard.adapter(track.id).is_some() { "bound" } else { "unbound" };
            writeln!(
                out,
                "#{} {} '{}' [{}] {} {}",
                i + 1,
                track.family().name(),
                track.name,
                track.binding().unwrap_or("-"),
                bound,
                track.id
            )?;
            match &track.content {
                TrackContent::Curve(curves) => {
                    for (j, segment) in curves.segments.iter().enumerate() {
                        let start: Vec<f32> = segment.curves.iter().map(|c| c.start_value()).collect();
                        let end: Vec<f32> = segment.curves.iter().map(|c| c.end_value()).collect();
                        writeln!(
                            out,
                            "   {}: {:.3} +{:.3}  {:?} -> {:?}",
                            j + 1,
                            segment.start_time,
                            segment.duration,
                            start,
                            end
                        )?;
                    }
                }
                TrackContent::Event(events) => {
                    for (j, segment) in events.segments.iter().enumerate() {
                        writeln!(out, "   {}: {:.3}  {}", j + 1, segment.start_time, segment.payload)?;
                    }
                }
            }
        }
        Ok(())
    }
}
