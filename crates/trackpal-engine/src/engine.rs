//! The engine: one value owning the whole touch-intent pipeline.
//!
//! All state mutation happens on the thread that drains the engine's queue.
//! Producers (the raw multitouch callback, the frame clock) post plain-data
//! messages; the interceptor callback gets a `Send` filter handle that reads
//! only the shared flags. The host wires the OS-specific collaborators in
//! through [`Capabilities`].

use std::sync::Arc;

use thiserror::Error;
use trackpal_core::capabilities::{
    EventSink, FrameClock, FrameSubscription, SettingsStore, TapControl,
};
use trackpal_core::config::{CornerAction, EngineConfig};
use trackpal_core::contact::{ContactFrame, ContactState};
use trackpal_core::events::{ScrollEvent, SyntheticEvent};
use trackpal_core::runtime::{engine_queue, EngineInbox, EngineMessage, EngineQueue, SharedFlags};

use crate::arbiter::{FingerCountArbiter, FingerTransition};
use crate::classifier::{classify, FilterCounters, TouchVerdict};
use crate::constants::MIDDLE_CLICK_TAP_SLOP;
use crate::emitter;
use crate::inertia::InertiaEngine;
use crate::intent::{self, on_axis_ratio, IntentDecision};
use crate::interceptor::InterceptorFilter;
use crate::learner::AdaptiveLearner;
use crate::recorder::{ActivationSnapshot, SessionRecord, SessionRecorder};
use crate::session::TouchSession;
use crate::zone::{zone_at, Axis, Zone};

/// Startup-boundary failures. Once running, the engine only degrades.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("multitouch source unavailable (no trackpad device)")]
    SourceUnavailable,
    #[error("event tap could not be created; accessibility permission may be missing")]
    TapUnavailable,
}

/// The host-provided collaborators.
pub struct Capabilities {
    pub sink: Box<dyn EventSink>,
    pub frame_clock: Box<dyn FrameClock>,
    pub tap: Arc<dyn TapControl>,
    pub store: Box<dyn SettingsStore>,
}

/// The touch intent engine.
pub struct Engine {
    config: EngineConfig,
    flags: SharedFlags,
    arbiter: FingerCountArbiter,
    session: Option<TouchSession>,
    inertia: InertiaEngine,
    learner: AdaptiveLearner,
    recorder: SessionRecorder,
    filter_counters: FilterCounters,
    sink: Box<dyn EventSink>,
    frame_clock: Box<dyn FrameClock>,
    tap: Arc<dyn TapControl>,
    store: Box<dyn SettingsStore>,
    queue: EngineQueue,
    inbox: EngineInbox,
    frame_subscription: Option<FrameSubscription>,
    enabled: bool,
}

impl Engine {
    /// Builds the engine, loading configuration and adaptive state from the
    /// store. A store full of garbage degrades to defaults; startup never
    /// fails on persisted data.
    pub fn new(mut capabilities: Capabilities) -> Self {
        let config = EngineConfig::load(capabilities.store.as_mut());
        let learner = AdaptiveLearner::load(capabilities.store.as_ref());
        let recorder = SessionRecorder::load(capabilities.store.as_ref());
        let (queue, inbox) = engine_queue();
        let enabled = config.is_enabled;
        Self {
            config,
            flags: SharedFlags::new(),
            arbiter: FingerCountArbiter::new(),
            session: None,
            inertia: InertiaEngine::new(),
            learner,
            recorder,
            filter_counters: FilterCounters::default(),
            sink: capabilities.sink,
            frame_clock: capabilities.frame_clock,
            tap: capabilities.tap,
            store: capabilities.store,
            queue,
            inbox,
            frame_subscription: None,
            enabled,
        }
    }

    /// Sender half of the main queue, for producer threads.
    pub fn queue(&self) -> EngineQueue {
        self.queue.clone()
    }

    /// The `Send` pass/drop filter for the event-tap callback thread.
    pub fn interceptor(&self) -> InterceptorFilter {
        InterceptorFilter::new(self.flags.clone(), self.tap.clone())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the configuration, clamping and persisting it. An in-flight
    /// session is reset so stale zone geometry cannot leak across.
    pub fn set_config(&mut self, mut config: EngineConfig) {
        config.clamp_ranges();
        self.reset_tracking();
        config.save(self.store.as_mut());
        self.store.flush();
        self.config = config;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disables the engine: cancels any session and coast-down, emits the
    /// recovery events downstream views need, and persists adaptive state.
    /// Idempotent; a second call is a no-op.
    pub fn disable(&mut self) {
        if self.enabled {
            log::debug!(
                "disabling; filtered {} light / {} large touches this run",
                self.filter_counters.too_light,
                self.filter_counters.too_large
            );
        }
        self.cancel_active();
        self.arbiter.reset();
        self.flags.set_finger_count(0);
        self.persist_adaptive();
        self.enabled = false;
    }

    /// Classifier verdict counters, for diagnostics.
    pub fn filter_counters(&self) -> FilterCounters {
        self.filter_counters
    }

    /// Called by the host when an external collaborator fails (no trackpad
    /// device, no event tap). Reports once through the log channel and
    /// disables; running sessions are never aborted to surface an error.
    pub fn report_degraded(&mut self, error: EngineError) {
        log::error!("{error}; engine disabled");
        self.disable();
    }

    /// Drains every pending message. The host calls this from its main loop
    /// whenever the queue has work.
    pub fn drain(&mut self) {
        while let Some(message) = self.inbox.try_recv() {
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::Frames {
                frames,
                timestamp,
                finger_count,
            } => self.on_frames(&frames, timestamp, finger_count),
            EngineMessage::InertiaTick { timestamp } => self.on_inertia_tick(timestamp),
            EngineMessage::Shutdown => self.disable(),
        }
    }

    /// Main-thread entry point for one raw frame batch.
    pub fn on_frames(&mut self, frames: &[ContactFrame], timestamp: f64, finger_count: u32) {
        if !self.enabled {
            return;
        }
        self.flags.set_finger_count(finger_count.min(u8::MAX as u32) as u8);

        match self.arbiter.observe(finger_count, timestamp) {
            FingerTransition::EnteredMulti => {
                self.cancel_active();
                return;
            }
            FingerTransition::AllReleased => {
                // The "all released" pseudo-frame: finalize a session whose
                // released contact frame never arrived.
                if self.session.is_some() {
                    self.end_session(timestamp);
                }
                return;
            }
            FingerTransition::None => {}
        }

        if finger_count != 1 {
            return;
        }
        if !self.arbiter.should_process_single_finger_touch(timestamp) {
            return;
        }
        let Some(frame) = frames.first().copied() else {
            return;
        };
        if frame.state == ContactState::Hover {
            return;
        }

        let verdict = classify(&frame, &self.config);
        if verdict != TouchVerdict::Valid {
            self.filter_counters.note(verdict);
            if self.session.is_some() {
                self.cancel_active();
            }
            return;
        }

        match frame.state {
            ContactState::Start | ContactState::Contact | ContactState::Move => {
                if self.session.is_none() {
                    self.start_session(&frame);
                } else {
                    self.process_move(&frame);
                }
            }
            ContactState::Lifting | ContactState::Released => {
                if self.session.is_some() {
                    self.end_session(frame.timestamp);
                }
            }
            ContactState::Hover => {}
        }
    }

    fn start_session(&mut self, frame: &ContactFrame) {
        // A new touch pre-empts any coast-down in progress.
        self.stop_inertia();

        let zone = zone_at(frame.x, frame.y, &self.config);
        let mut session = TouchSession::new(zone, (frame.x, frame.y), frame.timestamp);

        if zone.is_scroll_zone() || zone.is_corner() {
            intent::begin_activation(&mut session, &self.config);
            self.flags.set_actively_scrolling(true);
            if let Some(axis) = zone.axis() {
                self.learner.on_session_start(axis, frame.timestamp);
            }
        }
        self.session = Some(session);
    }

    fn process_move(&mut self, frame: &ContactFrame) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let delta = (
            frame.x - session.last_position.0,
            frame.y - session.last_position.1,
        );
        let dt = frame.timestamp - session.last_time;
        if dt > 0.0 {
            session.velocity_history.push(
                delta.0 / dt as f32,
                delta.1 / dt as f32,
                frame.timestamp,
            );
        }
        session.total_movement += (delta.0 * delta.0 + delta.1 * delta.1).sqrt();

        if session.activation.pending {
            let decision =
                intent::process_pending_frame(&mut session, frame, &self.learner, &self.config);
            session.last_position = (frame.x, frame.y);
            session.last_time = frame.timestamp;
            match decision {
                IntentDecision::Activated => self.activate(&mut session),
                IntentDecision::Rejected => self.reject(&mut session, frame.timestamp),
                IntentDecision::NeedMoreFrames => {}
            }
        } else if session.is_scrolling() {
            if let Some(axis) = session.zone.axis() {
                if let Some(event) = emitter::accumulate(&mut session, axis, delta, &self.config) {
                    self.sink.post(SyntheticEvent::Scroll(event));
                }
                let speed = session
                    .velocity_history
                    .latest()
                    .map(|s| (s.vx * s.vx + s.vy * s.vy).sqrt())
                    .unwrap_or(0.0);
                if let Some(record) = session.record.as_mut() {
                    record.note_delta(delta, speed);
                }
            }
            session.last_position = (frame.x, frame.y);
            session.last_time = frame.timestamp;
        } else {
            // Center, middle-click, or a rejected touch: the cursor owns it.
            session.last_position = (frame.x, frame.y);
            session.last_time = frame.timestamp;
        }

        self.session = Some(session);
    }

    /// Activation succeeded: flush the buffered ramp and begin emission.
    fn activate(&mut self, session: &mut TouchSession) {
        let Some(axis) = session.zone.axis() else {
            return;
        };
        session.activation.pending = false;

        let ratios: Vec<f32> = session
            .activation
            .deltas
            .iter()
            .skip(1)
            .filter_map(|&delta| on_axis_ratio(delta, axis))
            .collect();
        self.learner.on_successful_activation(axis, &ratios);

        let (on_axis_speed, off_axis_speed) = session
            .velocity_history
            .latest()
            .map(|s| match axis {
                Axis::Horizontal => (s.vx.abs(), s.vy.abs()),
                Axis::Vertical => (s.vy.abs(), s.vx.abs()),
            })
            .unwrap_or((0.0, 0.0));
        let snapshot = ActivationSnapshot {
            on_axis_ratio: ratios.last().copied().unwrap_or(0.0),
            on_axis_speed,
            off_axis_speed,
            density: session.activation.densities.last().copied().unwrap_or(0.0),
            confidence: session.activation.confidence,
        };
        session.record = Some(SessionRecord::new(
            session.zone,
            session.start_time,
            snapshot,
        ));

        self.sink
            .post(SyntheticEvent::Scroll(ScrollEvent::phase_began()));
        session.scroll_phase_began = true;

        for event in emitter::flush_buffered(session, axis, &self.config) {
            self.sink.post(SyntheticEvent::Scroll(event));
        }

        if self.learner.take_persist_due() {
            self.persist_adaptive();
        }
    }

    /// Activation failed: give the touch back to the cursor, or back to the
    /// corner tap handler if that is where it started.
    fn reject(&mut self, session: &mut TouchSession, timestamp: f64) {
        if let Some(axis) = session.zone.axis() {
            self.learner.on_activation_failure(axis, timestamp);
        }
        session.activation.clear();
        session.zone = if session.original_zone.is_corner() {
            session.original_zone
        } else {
            Zone::Center
        };
        self.flags.set_actively_scrolling(false);

        if self.learner.take_persist_due() {
            self.persist_adaptive();
        }
    }

    /// Lift-off: close out scrolling (possibly into inertia), or fire the
    /// tap the touch turned out to be.
    fn end_session(&mut self, timestamp: f64) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        if session.record.is_some() {
            // An activated scroll session.
            if session.scroll_phase_began {
                self.sink
                    .post(SyntheticEvent::Scroll(ScrollEvent::phase_ended()));
                session.scroll_phase_began = false;
            }
            if let Some(record) = session.record.take() {
                self.recorder.finish(record, timestamp, false);
            }
            if let Some(axis) = session.zone.axis() {
                let avg = session.velocity_history.average();
                if self
                    .inertia
                    .begin(axis, avg, self.config.scroll_multiplier)
                {
                    self.frame_subscription = Some(self.frame_clock.start(self.queue.clone()));
                }
            }
        } else if session.zone.is_corner() {
            // Tap, or a slide that never became a scroll: fire the corner.
            if let Some(corner) = session.zone.corner() {
                if self.config.corner_trigger_enabled {
                    let action = self.config.corner_action(corner);
                    if action != CornerAction::None {
                        self.sink.post(SyntheticEvent::CornerAction(action));
                    }
                }
            }
        } else if session.zone == Zone::MiddleClick
            && self.config.middle_click_enabled
            && session.total_movement < MIDDLE_CLICK_TAP_SLOP
        {
            self.sink.post(SyntheticEvent::MiddleClick);
        }

        self.flags.set_actively_scrolling(false);
    }

    /// Cancels whatever is in flight: session, phase, coast-down. Used on
    /// multi-finger transitions, classifier rejections mid-session, and
    /// disable.
    fn cancel_active(&mut self) {
        if let Some(mut session) = self.session.take() {
            if session.scroll_phase_began {
                self.sink
                    .post(SyntheticEvent::Scroll(ScrollEvent::phase_ended()));
                session.scroll_phase_began = false;
            }
            if let Some(record) = session.record.take() {
                self.recorder.finish(record, session.last_time, true);
            }
        }
        self.stop_inertia();
        self.flags.set_actively_scrolling(false);
    }

    /// Clears tracking state without learning from it.
    fn reset_tracking(&mut self) {
        if let Some(session) = self.session.take() {
            if session.scroll_phase_began {
                self.sink
                    .post(SyntheticEvent::Scroll(ScrollEvent::phase_ended()));
            }
        }
        self.stop_inertia();
        self.flags.set_actively_scrolling(false);
    }

    fn on_inertia_tick(&mut self, timestamp: f64) {
        let step = self.inertia.on_tick(timestamp);
        if let Some(event) = step.event {
            self.sink.post(SyntheticEvent::Scroll(event));
        }
        if step.finished {
            self.frame_subscription = None;
        }
    }

    fn stop_inertia(&mut self) {
        if let Some(event) = self.inertia.stop() {
            self.sink.post(SyntheticEvent::Scroll(event));
        }
        self.frame_subscription = None;
    }

    fn persist_adaptive(&mut self) {
        self.learner.save(self.store.as_mut());
        self.recorder.save(self.store.as_mut());
        self.store.flush();
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.persist_adaptive();
    }
}
