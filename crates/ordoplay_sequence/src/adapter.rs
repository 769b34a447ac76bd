// SPDX-License-Identifier: MIT OR Apache-2.0
//! Adapters: the runtime bridge from a bound track to its sink.

use crate::binding::{BindError, BindingRegistry, EventSink, Sink, ValueSink};
use crate::track::{Track, TrackContent, TrackId};
use std::cell::Cell;
use std::sync::Arc;

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is pushing values to sinks
pub fn is_dispatching() -> bool {
    DISPATCHING.with(Cell::get)
}

/// Marks the current thread as dispatching until dropped
pub(crate) struct DispatchScope {
    outer: bool,
}

impl DispatchScope {
    pub(crate) fn enter() -> Self {
        let outer = DISPATCHING.with(|d| d.replace(true));
        Self { outer }
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        DISPATCHING.with(|d| d.set(self.outer));
    }
}

/// Playhead movement during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    /// Time before the tick
    pub previous: f64,
    /// Time after the tick
    pub current: f64,
    /// Sequence duration
    pub duration: f64,
    /// Whether time advanced this tick
    pub advanced: bool,
    /// Whether time ran backwards
    pub reverse: bool,
    /// Whether time wrapped around a loop boundary
    pub wrapped: bool,
    /// Whether events exactly at `previous` fire
    pub inclusive: bool,
}

/// A time interval the playhead crossed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Lower bound
    pub start: f64,
    /// Upper bound
    pub end: f64,
    /// Whether the lower bound is included
    pub include_start: bool,
    /// Whether the upper bound is included
    pub include_end: bool,
}

impl Playhead {
    /// A playhead resting at `time`
    pub fn still(time: f64, duration: f64) -> Self {
        Self {
            previous: time,
            current: time,
            duration,
            advanced: false,
            reverse: false,
            wrapped: false,
            inclusive: false,
        }
    }

    /// Intervals crossed this tick, in crossing order
    pub fn crossed(&self) -> [Option<Span>; 2] {
        if !self.advanced {
            return [None, None];
        }
        let (previous, current, fresh) = (self.previous, self.current, self.inclusive);
        match (self.reverse, self.wrapped) {
            (false, false) => [Some(Span::new(previous, current, fresh, true)), None],
            (false, true) => [
                Some(Span::new(previous, self.duration, fresh, true)),
                Some(Span::new(0.0, current, true, true)),
            ],
            (true, false) => [Some(Span::new(current, previous, true, fresh)), None],
            (true, true) => [
                Some(Span::new(0.0, previous, true, fresh)),
                Some(Span::new(current, self.duration, true, true)),
            ],
        }
    }
}

impl Span {
    fn new(start: f64, end: f64, include_start: bool, include_end: bool) -> Self {
        Self {
            start,
            end,
            include_start,
            include_end,
        }
    }
}

/// Samples a bound track each tick and forwards the result
#[derive(Clone)]
pub enum Adapter {
    /// Pushes sampled curve values
    Curve {
        /// Bound track
        track_id: TrackId,
        /// Target sink
        sink: Arc<dyn ValueSink>,
    },
    /// Fires crossed events
    Event {
        /// Bound track
        track_id: TrackId,
        /// Target sink
        sink: Arc<dyn EventSink>,
    },
}

impl Adapter {
    /// Build the adapter for `track`, bound to `binding`
    pub fn create(
        track: &Track,
        binding: &str,
        registry: &BindingRegistry,
    ) -> Result<Self, BindError> {
        let track_id = track.id;
        Ok(match registry.resolve_for(binding, track.family())? {
            Sink::Value(sink) => Self::Curve { track_id, sink },
            Sink::Event(sink) => Self::Event { track_id, sink },
        })
    }

    /// The bound track
    pub fn track_id(&self) -> TrackId {
        match self {
            Self::Curve { track_id, .. } | Self::Event { track_id, .. } => *track_id,
        }
    }

    /// Forward the track's state at this tick to the sink
    pub fn update(&self, track: &Track, playhead: &Playhead) {
        match (self, &track.content) {
            (Self::Curve { sink, .. }, TrackContent::Curve(curves)) => {
                if let Some(value) = curves.sample(playhead.current) {
                    sink.push(&value);
                }
            }
            (Self::Event { sink, .. }, TrackContent::Event(events)) => {
                for span in playhead.crossed().into_iter().flatten() {
                    for event in events.events_between(
                        span.start,
                        span.end,
                        span.include_start,
                        span.include_end,
                    ) {
                        sink.fire(&event.payload);
                    }
                }
            }
            _ => tracing::trace!("Adapter family does not match track {}", track.id),
        }
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Curve { track_id, sink } => {
                write!(f, "Adapter::Curve({track_id}, {})", sink.kind().name())
            }
            Self::Event { track_id, .. } => write!(f, "Adapter::Event({track_id})"),
        }
    }
}
