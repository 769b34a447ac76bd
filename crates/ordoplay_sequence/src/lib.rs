// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline animation engine for OrdoPlay.
//!
//! This crate provides time-addressable sequences and their playback:
//! - Curve tracks of floats and 2/3/4-vectors, built from contiguous segments
//! - Event tracks firing payloads as the playhead crosses them
//! - A real-time player with play/pause/loop/speed transport
//! - Controllers, the only mutation surface over a playing sequence
//!
//! ## Architecture
//!
//! The [`Player`] owns the [`Sequence`] and the adapters that forward sampled
//! values to sinks registered in a [`BindingRegistry`]. Its tick loop and
//! every controller operation serialize on one gate, so a tick sees an edit
//! either completely or not at all.

pub mod adapter;
pub mod binding;
pub mod codec;
pub mod config;
pub mod controller;
pub mod curve;
pub mod player;
pub mod segment;
pub mod sequence;
pub mod track;
pub mod value;

pub use adapter::{Adapter, Playhead};
pub use binding::{BindError, BindingRegistry, EventQueue, EventSink, Sink, ValueSink, ValueSlot};
pub use codec::{CodecError, FileCodec, SequenceCodec, ShowDocument, ShowFormat};
pub use config::{ClockMode, ConfigError, PlayerConfig};
pub use controller::{CurveController, EventController, SequenceController, SequenceEditor};
pub use curve::{
    ControlPoint, Curve, CurveError, Interpolation, InterpolationMode, Tangent, TangentSide,
};
pub use player::{LoadOutcome, Player, PlayerError, PlayerGuard, Transport};
pub use segment::{CurveSegment, EventSegment, SegmentId, SegmentValue};
pub use sequence::{Sequence, SequenceId, StructureError};
pub use track::{CurveTrack, EventTrack, Track, TrackContent, TrackId};
pub use value::{CurveKind, CurveValue, EventPayload, TrackFamily};
