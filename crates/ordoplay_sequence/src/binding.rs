// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sink binding for tracks.
//!
//! A track names its target by an opaque binding string. The host registers
//! sinks under those strings in a [`BindingRegistry`]; the player resolves
//! them whenever a track is bound or a show is loaded.

use crate::value::{CurveKind, CurveValue, EventPayload, TrackFamily};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Receives sampled values of a curve track
pub trait ValueSink: Send + Sync {
    /// Kind of value this sink accepts
    fn kind(&self) -> CurveKind;

    /// Accept the value sampled this tick
    fn push(&self, value: &CurveValue);
}

/// Receives the events an event track fires
pub trait EventSink: Send + Sync {
    /// Accept a fired event
    fn fire(&self, payload: &EventPayload);
}

/// A registered sink
#[derive(Clone)]
pub enum Sink {
    /// Value sink for curve tracks
    Value(Arc<dyn ValueSink>),
    /// Event sink for event tracks
    Event(Arc<dyn EventSink>),
}

impl Sink {
    /// Name of what this sink accepts, for diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Value(sink) => sink.kind().name(),
            Self::Event(_) => "Event",
        }
    }

    /// Whether a track of `family` can drive this sink
    pub fn accepts(&self, family: TrackFamily) -> bool {
        match (self, family) {
            (Self::Value(sink), TrackFamily::Curve(kind)) => sink.kind() == kind,
            (Self::Event(_), TrackFamily::Event) => true,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sink({})", self.describe())
    }
}

/// Binding failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    /// Nothing is registered under the binding
    #[error("No sink registered as '{0}'")]
    Unresolved(String),

    /// The registered sink does not accept the track's values
    #[error("Sink '{binding}' accepts {found}, track produces {expected}")]
    Incompatible {
        /// Binding identifier
        binding: String,
        /// What the track produces
        expected: &'static str,
        /// What the sink accepts
        found: &'static str,
    },
}

/// Registration table resolving binding identifiers to sinks
#[derive(Default)]
pub struct BindingRegistry {
    sinks: RwLock<IndexMap<String, Sink>>,
}

impl BindingRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value sink, replacing any previous sink under `id`
    pub fn register_value(&self, id: impl Into<String>, sink: Arc<dyn ValueSink>) {
        self.sinks.write().insert(id.into(), Sink::Value(sink));
    }

    /// Register an event sink, replacing any previous sink under `id`
    pub fn register_event(&self, id: impl Into<String>, sink: Arc<dyn EventSink>) {
        self.sinks.write().insert(id.into(), Sink::Event(sink));
    }

    /// Remove a sink
    pub fn unregister(&self, id: &str) -> bool {
        self.sinks.write().shift_remove(id).is_some()
    }

    /// Look up a sink
    pub fn resolve(&self, id: &str) -> Option<Sink> {
        self.sinks.read().get(id).cloned()
    }

    /// Look up a sink that a track of `family` can drive
    pub fn resolve_for(&self, id: &str, family: TrackFamily) -> Result<Sink, BindError> {
        let sink = self
            .resolve(id)
            .ok_or_else(|| BindError::Unresolved(id.to_string()))?;
        if !sink.accepts(family) {
            return Err(BindError::Incompatible {
                binding: id.to_string(),
                expected: family.name(),
                found: sink.describe(),
            });
        }
        Ok(sink)
    }

    /// Registered identifiers with what they accept
    pub fn entries(&self) -> Vec<(String, &'static str)> {
        self.sinks
            .read()
            .iter()
            .map(|(id, sink)| (id.clone(), sink.describe()))
            .collect()
    }
}

/// Value sink that latches the latest value for the host thread
pub struct ValueSlot {
    kind: CurveKind,
    latest: Mutex<Option<CurveValue>>,
}

impl ValueSlot {
    /// Create an empty slot
    pub fn new(kind: CurveKind) -> Self {
        Self {
            kind,
            latest: Mutex::new(None),
        }
    }

    /// Take the latest value, leaving the slot empty
    pub fn take(&self) -> Option<CurveValue> {
        self.latest.lock().take()
    }

    /// Read the latest value without consuming it
    pub fn peek(&self) -> Option<CurveValue> {
        *self.latest.lock()
    }
}

impl ValueSink for ValueSlot {
    fn kind(&self) -> CurveKind {
        self.kind
    }

    fn push(&self, value: &CurveValue) {
        *self.latest.lock() = Some(*value);
    }
}

/// Event sink that buffers payloads for the host thread
#[derive(Default)]
pub struct EventQueue {
    pending: Mutex<Vec<EventPayload>>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered payload, oldest first
    pub fn drain(&self) -> Vec<EventPayload> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Number of buffered payloads
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl EventSink for EventQueue {
    fn fire(&self, payload: &EventPayload) {
        self.pending.lock().push(payload.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_checks_family() {
        let registry = BindingRegistry::new();
        registry.register_value("light.color", Arc::new(ValueSlot::new(CurveKind::Vec3)));
        registry.register_event("cues", Arc::new(EventQueue::new()));

        assert!(registry
            .resolve_for("light.color", TrackFamily::Curve(CurveKind::Vec3))
            .is_ok());
        assert_eq!(
            registry
                .resolve_for("light.color", TrackFamily::Curve(CurveKind::Float))
                .err(),
            Some(BindError::Incompatible {
                binding: "light.color".into(),
                expected: "Float",
                found: "Vec3",
            })
        );
        assert!(registry.resolve_for("cues", TrackFamily::Event).is_ok());
        assert_eq!(
            registry.resolve_for("missing", TrackFamily::Event).err(),
            Some(BindError::Unresolved("missing".into()))
        );
    }

    #[test]
    fn test_unregister() {
        let registry = BindingRegistry::new();
        registry.register_event("cues", Arc::new(EventQueue::new()));
        assert_eq!(registry.entries(), vec![("cues".to_string(), "Event")]);
        assert!(registry.unregister("cues"));
        assert!(!registry.unregister("cues"));
        assert!(registry.resolve("cues").is_none());
    }

    #[test]
    fn test_value_slot_latches_latest() {
        let slot = ValueSlot::new(CurveKind::Float);
        slot.push(&CurveValue::Float(0.1));
        slot.push(&CurveValue::Float(0.7));
        assert_eq!(slot.peek(), Some(CurveValue::Float(0.7)));
        assert_eq!(slot.take(), Some(CurveValue::Float(0.7)));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_event_queue_drains_in_order() {
        let queue = EventQueue::new();
        queue.fire(&EventPayload::Int(1));
        queue.fire(&EventPayload::Text("two".into()));
        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.drain(),
            vec![EventPayload::Int(1), EventPayload::Text("two".into())]
        );
        assert!(queue.is_empty());
    }
}
