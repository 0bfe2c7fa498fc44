//! Fake collaborators and the scripted engine harness.
//!
//! The harness runs a real [`Engine`] against in-memory stand-ins for every
//! capability: a recording sink instead of the OS event stream, a manually
//! stepped frame clock instead of the display link, and a map-backed settings
//! store. Tests script touches and assert on the exact event stream the
//! engine would have injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use trackpal_core::capabilities::{
    EventSink, FrameClock, FrameSubscription, SettingValue, SettingsStore, TapControl,
};
use trackpal_core::config::EngineConfig;
use trackpal_core::contact::ContactFrame;
use trackpal_core::events::{ScrollEvent, SyntheticEvent};
use trackpal_core::runtime::{EngineMessage, EngineQueue};
use trackpal_engine::engine::{Capabilities, Engine};

use crate::frames::TouchStroke;

// ============================================================================
// Fake collaborators
// ============================================================================

/// Event sink that records everything the engine posts.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SyntheticEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyntheticEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn scroll_events(&self) -> Vec<ScrollEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SyntheticEvent::Scroll(scroll) => Some(scroll),
                _ => None,
            })
            .collect()
    }

    /// Sum of emitted pixel deltas `(dx, dy)`.
    pub fn total_pixels(&self) -> (i64, i64) {
        self.scroll_events()
            .iter()
            .fold((0, 0), |(ax, ay), e| {
                (ax + e.pixel_dx as i64, ay + e.pixel_dy as i64)
            })
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for RecordingSink {
    fn post(&self, event: SyntheticEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
struct ClockState {
    queue: Option<EngineQueue>,
    running: bool,
    time: f64,
}

/// Frame clock stepped explicitly by the test.
#[derive(Clone, Default)]
pub struct ManualFrameClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    /// Advances the clock by `dt` seconds and posts one tick, if running.
    pub fn tick(&self, dt: f64) {
        let (queue, time) = {
            let mut state = self.state.lock().unwrap();
            if !state.running {
                return;
            }
            state.time += dt;
            (state.queue.clone(), state.time)
        };
        if let Some(queue) = queue {
            queue.post(EngineMessage::InertiaTick { timestamp: time });
        }
    }
}

impl FrameClock for ManualFrameClock {
    fn start(&self, queue: EngineQueue) -> FrameSubscription {
        {
            let mut state = self.state.lock().unwrap();
            state.queue = Some(queue);
            state.running = true;
        }
        let state = Arc::clone(&self.state);
        FrameSubscription::new(move || {
            let mut state = state.lock().unwrap();
            state.running = false;
            state.queue = None;
        })
    }
}

/// Map-backed settings store.
#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, SettingValue>,
    pub flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated with a saved configuration.
    pub fn with_config(config: &EngineConfig) -> Self {
        let mut store = Self::new();
        config.save(&mut store);
        store
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }
    fn set(&mut self, key: &str, value: SettingValue) {
        self.values.insert(key.to_owned(), value);
    }
    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
    fn flush(&mut self) {
        self.flushes += 1;
    }
}

/// Tap control that counts re-enables.
#[derive(Clone, Default)]
pub struct CountingTap {
    re_enables: Arc<AtomicUsize>,
}

impl CountingTap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn re_enables(&self) -> usize {
        self.re_enables.load(Ordering::SeqCst)
    }
}

impl TapControl for CountingTap {
    fn re_enable(&self) {
        self.re_enables.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A real engine wired to fakes, with scripting and assertion helpers.
pub struct EngineHarness {
    pub engine: Engine,
    pub sink: RecordingSink,
    pub clock: ManualFrameClock,
    pub tap: CountingTap,
}

impl EngineHarness {
    /// Engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine loaded from a store pre-seeded with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_store(MemoryStore::with_config(&config))
    }

    /// Engine loaded from an arbitrary pre-seeded store.
    pub fn with_store(store: MemoryStore) -> Self {
        let sink = RecordingSink::new();
        let clock = ManualFrameClock::new();
        let tap = CountingTap::new();
        let engine = Engine::new(Capabilities {
            sink: Box::new(sink.clone()),
            frame_clock: Box::new(clock.clone()),
            tap: Arc::new(tap.clone()),
            store: Box::new(store),
        });
        Self {
            engine,
            sink,
            clock,
            tap,
        }
    }

    /// Feeds one single-finger frame straight into the engine.
    pub fn send_frame(&mut self, frame: ContactFrame) {
        self.engine.on_frames(&[frame], frame.timestamp, 1);
    }

    /// Feeds a frame batch with an explicit finger count (multi-finger
    /// batches and the zero-finger pseudo-frame).
    pub fn send_batch(&mut self, frames: &[ContactFrame], timestamp: f64, finger_count: u32) {
        self.engine.on_frames(frames, timestamp, finger_count);
    }

    /// Plays a whole scripted stroke, including its release frame.
    pub fn play(&mut self, stroke: &TouchStroke) {
        for frame in stroke.frames() {
            self.send_frame(frame);
        }
    }

    /// Steps the frame clock `ticks` times at 60 Hz and drains the queue
    /// after each step, as the host main loop would.
    pub fn run_inertia(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.clock.tick(1.0 / 60.0);
            self.engine.drain();
        }
    }
}

impl Default for EngineHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackpal_core::events::TRACKPAL_EVENT_TAG;

    #[test]
    fn test_harness_records_a_scroll() {
        let mut harness = EngineHarness::new();
        harness.play(&TouchStroke::new((0.95, 0.5), (0.95, 0.35), 5));
        let scrolls = harness.sink.scroll_events();
        assert!(!scrolls.is_empty());
        assert!(scrolls.iter().all(|e| e.user_tag == TRACKPAL_EVENT_TAG));
    }

    #[test]
    fn test_manual_clock_lifecycle() {
        let clock = ManualFrameClock::new();
        assert!(!clock.is_running());
        let (queue, inbox) = trackpal_core::runtime::engine_queue();
        let subscription = clock.start(queue);
        assert!(clock.is_running());
        clock.tick(0.016);
        assert!(matches!(
            inbox.try_recv(),
            Some(EngineMessage::InertiaTick { .. })
        ));
        subscription.cancel();
        assert!(!clock.is_running());
        clock.tick(0.016);
        assert!(inbox.try_recv().is_none());
    }
}
