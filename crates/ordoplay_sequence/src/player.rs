// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence player: owns the sequence, the adapters and the tick loop.
//!
//! Every read or write of the sequence and the adapter map goes through the
//! player's single gate ([`Player::lock`]). The tick loop holds the gate for
//! the whole of each tick, sink dispatch included, so a sink must never call
//! back into the player or a controller. Use [`ValueSlot`] and [`EventQueue`]
//! to hand values to another thread instead.
//!
//! [`ValueSlot`]: crate::binding::ValueSlot
//! [`EventQueue`]: crate::binding::EventQueue

use crate::adapter::{self, Adapter, DispatchScope, Playhead};
use crate::binding::{BindError, BindingRegistry};
use crate::codec::{CodecError, FileCodec, SequenceCodec};
use crate::config::{ClockMode, ConfigError, PlayerConfig};
use crate::sequence::Sequence;
use crate::track::TrackId;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Playback speed limit in either direction
pub const MAX_SPEED: f64 = 10.0;

/// Shortest tick the loop advances by, in seconds
pub const MIN_TICK: f64 = 1.0e-6;

/// Player errors
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Show could not be read or written
    #[error("Show error: {0}")]
    Codec(#[from] CodecError),

    /// Settings the tick thread cannot run with
    #[error("Invalid player config: {0}")]
    Config(#[from] ConfigError),

    /// Tick thread could not be started
    #[error("Failed to start tick thread: {0}")]
    Spawn(std::io::Error),
}

/// Result of a successful [`Player::load`]
#[derive(Debug)]
pub enum LoadOutcome {
    /// The show was loaded
    Loaded,
    /// The show failed to load and an empty sequence replaced it
    Empty(CodecError),
}

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transport {
    /// Current time in seconds
    pub time: f64,
    /// Whether playback is running
    pub playing: bool,
    /// Whether running playback is held
    pub paused: bool,
    /// Whether playback wraps at the ends
    pub looping: bool,
    /// Speed factor, negative plays backwards
    pub speed: f64,
    /// Whether the next advance fires events at its start time
    fresh: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            time: 0.0,
            playing: false,
            paused: false,
            looping: false,
            speed: 1.0,
            fresh: true,
        }
    }
}

/// State guarded by the player's gate
#[derive(Debug)]
pub struct PlayerState {
    sequence: Sequence,
    adapters: HashMap<TrackId, Adapter>,
    transport: Transport,
}

impl PlayerState {
    fn new(sequence: Sequence) -> Self {
        Self {
            sequence,
            adapters: HashMap::new(),
            transport: Transport::default(),
        }
    }

    /// Advance the transport by `elapsed` seconds
    fn advance(&mut self, elapsed: f64) -> Playhead {
        let duration = self.sequence.duration();
        let transport = &mut self.transport;
        let previous = transport.time;
        if !transport.playing || transport.paused {
            return Playhead::still(previous, duration);
        }
        if duration <= 0.0 {
            transport.time = 0.0;
            if !transport.looping {
                transport.playing = false;
            }
            return Playhead::still(0.0, duration);
        }

        let reverse = transport.speed < 0.0;
        let mut time = previous + elapsed * transport.speed;
        let mut wrapped = false;
        if transport.looping {
            if time > duration || time < 0.0 {
                time = time.rem_euclid(duration);
                wrapped = true;
            }
        } else if time >= duration {
            time = duration;
            transport.playing = false;
        } else if time <= 0.0 && reverse {
            time = 0.0;
            transport.playing = false;
        }

        let playhead = Playhead {
            previous,
            current: time,
            duration,
            advanced: true,
            reverse,
            wrapped,
            inclusive: transport.fresh,
        };
        transport.time = time;
        transport.fresh = false;
        playhead
    }

    fn tick(&mut self, elapsed: f64, sample_while_stopped: bool) {
        let was_playing = self.transport.playing;
        let playhead = self.advance(elapsed);
        if !(was_playing || sample_while_stopped) {
            return;
        }

        let _scope = DispatchScope::enter();
        for adapter in self.adapters.values() {
            if let Some(track) = self.sequence.track(adapter.track_id()) {
                adapter.update(track, &playhead);
            }
        }
    }

    fn install(&mut self, sequence: Sequence, registry: &BindingRegistry) {
        self.sequence = sequence;
        self.transport.time = 0.0;
        self.transport.fresh = true;
        self.rebuild_adapters(registry);
    }

    fn rebuild_adapters(&mut self, registry: &BindingRegistry) -> usize {
        self.adapters.clear();
        for track in self.sequence.tracks() {
            let Some(binding) = track.binding() else {
                continue;
            };
            match Adapter::create(track, binding, registry) {
                Ok(adapter) => {
                    self.adapters.insert(track.id, adapter);
                }
                Err(e) => tracing::warn!("Track '{}' left unbound: {}", track.name, e),
            }
        }
        self.adapters.len()
    }
}

/// Scoped hold on the player's gate
pub struct PlayerGuard<'a> {
    state: MutexGuard<'a, PlayerState>,
    registry: &'a BindingRegistry,
}

impl PlayerGuard<'_> {
    /// The loaded sequence
    pub fn sequence(&self) -> &Sequence {
        &self.state.sequence
    }

    /// The loaded sequence, for editing
    pub fn sequence_mut(&mut self) -> &mut Sequence {
        &mut self.state.sequence
    }

    /// Transport state
    pub fn transport(&self) -> &Transport {
        &self.state.transport
    }

    /// Adapter of a bound track
    pub fn adapter(&self, track_id: TrackId) -> Option<&Adapter> {
        self.state.adapters.get(&track_id)
    }

    /// Number of live adapters
    pub fn adapter_count(&self) -> usize {
        self.state.adapters.len()
    }

    /// Build the adapter binding `track_id` to `binding`, replacing any
    /// existing one. On failure the previous adapter is kept.
    pub fn bind_track(&mut self, track_id: TrackId, binding: &str) -> Result<(), BindError> {
        let Some(track) = self.state.sequence.track(track_id) else {
            return Err(BindError::Unresolved(binding.to_string()));
        };
        let adapter = Adapter::create(track, binding, self.registry)?;
        self.state.adapters.insert(track_id, adapter);
        Ok(())
    }

    /// Drop the adapter of a track
    pub fn unbind_track(&mut self, track_id: TrackId) -> bool {
        self.state.adapters.remove(&track_id).is_some()
    }

    /// Rebuild every adapter from the tracks' bindings
    pub fn rebind_all(&mut self) -> usize {
        self.state.rebuild_adapters(self.registry)
    }
}

struct Shared {
    gate: Mutex<PlayerState>,
    running: AtomicBool,
    config: PlayerConfig,
    codec: Box<dyn SequenceCodec>,
    registry: Arc<BindingRegistry>,
}

impl Shared {
    /// Lock the gate, refusing callers that are inside a sink dispatch
    fn gate(&self) -> MutexGuard<'_, PlayerState> {
        if adapter::is_dispatching() {
            tracing::error!("Sink called back into the player while the gate is held");
            if cfg!(debug_assertions) {
                panic!("sink re-entered the sequence player");
            }
        }
        self.gate.lock()
    }

    fn tick(&self, elapsed: f64) {
        let elapsed = elapsed.max(MIN_TICK);
        self.gate().tick(elapsed, self.config.sample_while_stopped);
    }

    fn run(&self) {
        let period = self.config.tick_period();
        let mut last = Instant::now();
        while self.running.load(Ordering::Acquire) {
            let now = Instant::now();
            let micros = now.duration_since(last).as_micros().max(1);
            last = now;
            self.tick(micros as f64 / 1.0e6);

            let spent = now.elapsed();
            if spent < period {
                std::thread::sleep(period - spent);
            }
        }
    }
}

/// Plays a sequence, driving bound sinks from a tick loop
pub struct Player {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Create a player with an empty sequence
    pub fn new(
        config: PlayerConfig,
        codec: Box<dyn SequenceCodec>,
        registry: Arc<BindingRegistry>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                gate: Mutex::new(PlayerState::new(Sequence::empty())),
                running: AtomicBool::new(false),
                config,
                codec,
                registry,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Create a player storing shows as files per `config`
    pub fn from_config(config: PlayerConfig, registry: Arc<BindingRegistry>) -> Self {
        let codec = FileCodec::new(config.show_directory.clone(), config.format);
        Self::new(config, Box::new(codec), registry)
    }

    /// Load the configured default show, then start the clock
    pub fn init(&self) -> Result<(), PlayerError> {
        if let Some(name) = self.shared.config.default_show.clone() {
            self.load(&name)?;
        }
        self.start()
    }

    /// Start the tick thread. Does nothing under the manual clock or when
    /// already running.
    pub fn start(&self) -> Result<(), PlayerError> {
        if self.shared.config.clock == ClockMode::Manual {
            return Ok(());
        }
        self.shared.config.validate()?;
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("sequence-player".into())
            .spawn(move || shared.run())
            .map_err(|e| {
                self.shared.running.store(false, Ordering::Release);
                PlayerError::Spawn(e)
            })?;
        *worker = Some(handle);
        tracing::info!(
            "Sequence player started at {} Hz",
            self.shared.config.frequency
        );
        Ok(())
    }

    /// Stop the tick thread after its current tick
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                tracing::error!("Sequence player thread panicked");
            } else {
                tracing::info!("Sequence player stopped");
            }
        }
    }

    /// Whether the tick thread is running
    pub fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    /// Acquire the gate guarding the sequence and adapters
    pub fn lock(&self) -> PlayerGuard<'_> {
        PlayerGuard {
            state: self.shared.gate(),
            registry: self.shared.registry.as_ref(),
        }
    }

    /// Run one tick of `delta` seconds. This is the manual clock.
    pub fn update(&self, delta: Duration) {
        self.shared.tick(delta.as_secs_f64());
    }

    /// Player settings
    pub fn config(&self) -> &PlayerConfig {
        &self.shared.config
    }

    /// Sink registry used for binding
    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.shared.registry
    }

    /// Load a show by name.
    ///
    /// On failure the previous sequence stays, unless the player is
    /// configured to fall back to an empty sequence.
    pub fn load(&self, name: &str) -> Result<LoadOutcome, PlayerError> {
        match self.shared.codec.read(name) {
            Ok(sequence) => {
                self.set_sequence(sequence);
                tracing::info!("Loaded show '{}'", name);
                Ok(LoadOutcome::Loaded)
            }
            Err(e) if self.shared.config.create_empty_on_load_failure => {
                tracing::warn!("Failed to load show '{}': {}. Using an empty sequence.", name, e);
                self.set_sequence(Sequence::empty());
                Ok(LoadOutcome::Empty(e))
            }
            Err(e) => {
                tracing::error!("Failed to load show '{}': {}", name, e);
                Err(e.into())
            }
        }
    }

    /// Save the loaded sequence under `name`
    pub fn save(&self, name: &str) -> Result<(), PlayerError> {
        let sequence = self.lock().sequence().clone();
        self.shared.codec.write(name, &sequence)?;
        tracing::info!("Saved show '{}'", name);
        Ok(())
    }

    /// Replace the loaded sequence and rebuild its adapters
    pub fn set_sequence(&self, sequence: Sequence) {
        let mut guard = self.lock();
        guard.state.install(sequence, &self.shared.registry);
        tracing::debug!("{} adapters bound", guard.adapter_count());
    }

    /// Rebuild adapters, retrying bindings whose sinks were missing
    pub fn rebind_all(&self) -> usize {
        self.lock().rebind_all()
    }

    /// Start playback. Playing forward from the end restarts at zero.
    pub fn play(&self) {
        let mut guard = self.lock();
        let duration = guard.state.sequence.duration();
        let transport = &mut guard.state.transport;
        if transport.speed >= 0.0 && transport.time >= duration {
            transport.time = 0.0;
        } else if transport.speed < 0.0 && transport.time <= 0.0 {
            transport.time = duration;
        }
        transport.playing = true;
        transport.paused = false;
        transport.fresh = true;
    }

    /// Stop playback and rewind to zero
    pub fn stop(&self) {
        let mut guard = self.lock();
        let transport = &mut guard.state.transport;
        transport.playing = false;
        transport.paused = false;
        transport.time = 0.0;
        transport.fresh = true;
    }

    /// Hold playback; ticks keep sampling
    pub fn pause(&self) {
        let mut guard = self.lock();
        let transport = &mut guard.state.transport;
        if transport.playing {
            transport.paused = true;
        }
    }

    /// Resume held playback
    pub fn unpause(&self) {
        self.lock().state.transport.paused = false;
    }

    /// Enable or disable looping
    pub fn set_looping(&self, looping: bool) {
        self.lock().state.transport.looping = looping;
    }

    /// Set the speed factor, clamped to `[-MAX_SPEED, MAX_SPEED]`
    pub fn set_speed(&self, speed: f64) {
        if !speed.is_finite() {
            tracing::debug!("Ignoring speed {}", speed);
            return;
        }
        self.lock().state.transport.speed = speed.clamp(-MAX_SPEED, MAX_SPEED);
    }

    /// Seek to `time`, clamped to the sequence. Seeking fires no events.
    pub fn set_time(&self, time: f64) {
        if !time.is_finite() {
            tracing::debug!("Ignoring seek to {}", time);
            return;
        }
        let mut guard = self.lock();
        let duration = guard.state.sequence.duration();
        let transport = &mut guard.state.transport;
        transport.time = time.clamp(0.0, duration);
        transport.fresh = true;
    }

    /// Current time in seconds
    pub fn time(&self) -> f64 {
        self.lock().state.transport.time
    }

    /// Duration of the loaded sequence
    pub fn duration(&self) -> f64 {
        self.lock().state.sequence.duration()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.lock().state.transport.playing
    }

    /// Whether playback is held
    pub fn is_paused(&self) -> bool {
        self.lock().state.transport.paused
    }

    /// Whether playback loops
    pub fn is_looping(&self) -> bool {
        self.lock().state.transport.looping
    }

    /// Speed factor
    pub fn speed(&self) -> f64 {
        self.lock().state.transport.speed
    }

    /// Snapshot of the transport
    pub fn transport(&self) -> Transport {
        *self.lock().transport()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{EventQueue, EventSink, ValueSlot};
    use crate::codec::ShowFormat;
    use crate::segment::{CurveSegment, EventSegment};
    use crate::track::Track;
    use crate::value::{CurveKind, CurveValue, EventPayload};
    use std::sync::OnceLock;
    use uuid::Uuid;

    fn manual_config() -> PlayerConfig {
        PlayerConfig {
            clock: ClockMode::Manual,
            show_directory: std::env::temp_dir()
                .join(format!("ordoplay_player_{}", Uuid::new_v4())),
            ..PlayerConfig::default()
        }
    }

    fn ramp_sequence(duration: f64) -> Sequence {
        let mut sequence = Sequence::new("Ramp");
        let mut track = Track::new_curve("Fade", CurveKind::Float);
        track.binding = Some("fade".into());
        if let Some(curves) = track.as_curve_mut() {
            let mut segment = CurveSegment::flat(CurveKind::Float, 0.0, duration, 0.0);
            segment.curves[0].set_end_value(1.0);
            curves.segments.push(segment);
        }
        sequence.add_track(track);
        sequence
    }

    fn player_with(sequence: Sequence) -> (Player, Arc<ValueSlot>) {
        let registry = Arc::new(BindingRegistry::new());
        let slot = Arc::new(ValueSlot::new(CurveKind::Float));
        registry.register_value("fade", slot.clone());
        let player = Player::from_config(manual_config(), registry);
        player.set_sequence(sequence);
        (player, slot)
    }

    fn seconds(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_loop_wraps_by_remainder() {
        let (player, _) = player_with(ramp_sequence(2.0));
        player.set_looping(true);
        player.play();
        player.update(seconds(1.0));
        player.update(seconds(1.0));
        player.update(seconds(0.5));
        assert!((player.time() - 0.5).abs() < 1e-9);
        assert!(player.is_playing());
    }

    #[test]
    fn test_paused_ticks_sample_without_advancing() {
        let (player, slot) = player_with(ramp_sequence(4.0));
        player.play();
        player.update(seconds(1.0));
        player.pause();
        slot.take();

        player.update(seconds(1.0));
        player.update(seconds(1.0));
        assert_eq!(player.time(), 1.0);
        assert_eq!(slot.take(), Some(CurveValue::Float(0.25)));
    }

    #[test]
    fn test_end_without_loop_clamps_and_stops() {
        let (player, slot) = player_with(ramp_sequence(2.0));
        player.play();
        player.update(seconds(3.0));
        assert_eq!(player.time(), 2.0);
        assert!(!player.is_playing());
        assert_eq!(slot.take(), Some(CurveValue::Float(1.0)));

        player.update(seconds(1.0));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn test_reverse_playback() {
        let (player, _) = player_with(ramp_sequence(2.0));
        player.set_speed(-1.0);
        player.set_time(1.5);
        player.play();
        player.update(seconds(1.0));
        assert!((player.time() - 0.5).abs() < 1e-9);
        player.update(seconds(1.0));
        assert_eq!(player.time(), 0.0);
        assert!(!player.is_playing());

        player.set_looping(true);
        player.play();
        player.update(seconds(0.5));
        assert!((player.time() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_transport_clamps() {
        let (player, _) = player_with(ramp_sequence(2.0));
        player.set_speed(50.0);
        assert_eq!(player.speed(), MAX_SPEED);
        player.set_speed(f64::NAN);
        assert_eq!(player.speed(), MAX_SPEED);
        player.set_time(9.0);
        assert_eq!(player.time(), 2.0);
        player.set_time(-1.0);
        assert_eq!(player.time(), 0.0);

        player.play();
        player.update(seconds(0.5));
        player.stop();
        assert_eq!(player.time(), 0.0);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_events_fire_once_per_crossing() {
        let mut sequence = Sequence::new("Cues");
        let mut track = Track::new_event("Cues");
        track.binding = Some("cues".into());
        if let Some(events) = track.as_event_mut() {
            events.insert(EventSegment::new(0.0, EventPayload::Int(0)));
            events.insert(EventSegment::new(1.0, EventPayload::Int(1)));
        }
        sequence.add_track(track);

        let registry = Arc::new(BindingRegistry::new());
        let queue = Arc::new(EventQueue::new());
        registry.register_event("cues", queue.clone());
        let player = Player::from_config(manual_config(), registry);
        player.set_sequence(sequence);

        player.play();
        player.update(seconds(0.5));
        assert_eq!(queue.drain(), vec![EventPayload::Int(0)]);
        player.update(seconds(0.25));
        assert!(queue.is_empty());
        player.update(seconds(0.5));
        assert_eq!(queue.drain(), vec![EventPayload::Int(1)]);
        assert!(!player.is_playing());

        player.set_time(0.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_unresolved_binding_is_not_fatal() {
        let registry = Arc::new(BindingRegistry::new());
        let player = Player::from_config(manual_config(), registry.clone());
        player.set_sequence(ramp_sequence(1.0));
        assert_eq!(player.lock().adapter_count(), 0);

        registry.register_value("fade", Arc::new(ValueSlot::new(CurveKind::Float)));
        assert_eq!(player.rebind_all(), 1);
    }

    #[test]
    fn test_load_failure_falls_back_to_empty() {
        let (player, _) = player_with(ramp_sequence(2.0));
        let outcome = player.load("missing").unwrap();
        assert!(matches!(outcome, LoadOutcome::Empty(CodecError::Io(_))));
        assert_eq!(player.duration(), 0.0);
        assert_eq!(player.lock().sequence().track_count(), 0);
    }

    #[test]
    fn test_load_failure_keeps_sequence_when_strict() {
        let config = PlayerConfig {
            create_empty_on_load_failure: false,
            ..manual_config()
        };
        let player = Player::from_config(config, Arc::new(BindingRegistry::new()));
        player.set_sequence(ramp_sequence(2.0));
        assert!(player.load("missing").is_err());
        assert_eq!(player.duration(), 2.0);
    }

    #[test]
    fn test_save_then_load_rebinds() {
        let (player, slot) = player_with(ramp_sequence(2.0));
        let before = player.lock().sequence().clone();
        player.save("ramp").unwrap();
        player.set_sequence(Sequence::empty());

        assert!(matches!(player.load("ramp").unwrap(), LoadOutcome::Loaded));
        assert_eq!(player.lock().sequence(), &before);
        assert_eq!(player.lock().adapter_count(), 1);

        player.set_time(1.0);
        player.play();
        player.update(seconds(0.0));
        assert!(slot.take().is_some());

        let _ = std::fs::remove_dir_all(&player.config().show_directory);
    }

    #[test]
    fn test_binary_shows_round_trip() {
        let config = PlayerConfig {
            format: ShowFormat::Binary,
            ..manual_config()
        };
        let player = Player::from_config(config, Arc::new(BindingRegistry::new()));
        player.set_sequence(ramp_sequence(3.0));
        player.save("binary").unwrap();
        player.set_sequence(Sequence::empty());
        player.load("binary").unwrap();
        assert_eq!(player.duration(), 3.0);

        let _ = std::fs::remove_dir_all(&player.config().show_directory);
    }

    #[test]
    fn test_threaded_clock_advances() {
        let config = PlayerConfig {
            clock: ClockMode::Threaded,
            ..manual_config()
        };
        let player = Player::from_config(config, Arc::new(BindingRegistry::new()));
        player.set_sequence(ramp_sequence(10.0));
        player.start().unwrap();
        assert!(player.is_running());
        player.play();
        std::thread::sleep(Duration::from_millis(50));
        assert!(player.time() > 0.0);
        player.shutdown();
        assert!(!player.is_running());
    }

    #[test]
    fn test_invalid_frequency_fails_to_start() {
        for frequency in [0.0, f64::NAN] {
            let config = PlayerConfig {
                clock: ClockMode::Threaded,
                frequency,
                ..manual_config()
            };
            let player = Player::from_config(config, Arc::new(BindingRegistry::new()));
            assert!(matches!(player.start(), Err(PlayerError::Config(_))));
            assert!(!player.is_running());
        }
    }

    #[cfg(debug_assertions)]
    struct Reentrant {
        player: OnceLock<Arc<Player>>,
        call: fn(&Player),
    }

    #[cfg(debug_assertions)]
    impl EventSink for Reentrant {
        fn fire(&self, _payload: &EventPayload) {
            if let Some(player) = self.player.get() {
                (self.call)(player);
            }
        }
    }

    #[cfg(debug_assertions)]
    fn reenter_from_sink(call: fn(&Player)) {
        let registry = Arc::new(BindingRegistry::new());
        let sink = Arc::new(Reentrant {
            player: OnceLock::new(),
            call,
        });
        registry.register_event("cues", sink.clone());

        let mut sequence = Sequence::new("Cues");
        let mut track = Track::new_event("Cues");
        track.binding = Some("cues".into());
        if let Some(events) = track.as_event_mut() {
            events.insert(EventSegment::new(0.05, EventPayload::Int(0)));
            events.insert(EventSegment::new(1.0, EventPayload::Int(1)));
        }
        sequence.add_track(track);

        let player = Arc::new(Player::from_config(manual_config(), registry));
        player.set_sequence(sequence);
        let _ = sink.player.set(Arc::clone(&player));
        player.play();
        player.update(seconds(0.1));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "re-entered")]
    fn test_reentrant_sink_is_caught() {
        reenter_from_sink(|player| {
            let _ = player.time();
        });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "re-entered")]
    fn test_reentrant_update_is_caught() {
        reenter_from_sink(|player| player.update(seconds(0.001)));
    }
}
