//! Inertial coast-down after lift-off.
//!
//! When a scroll session ends with enough velocity, the engine keeps emitting
//! momentum-tagged scroll events from the display frame clock, decaying the
//! velocity with a continuous exponential friction model until both axes fall
//! below the minimum. The frame clock posts ticks onto the main queue; all
//! state here is main-thread-owned.

use trackpal_core::events::{MomentumPhase, ScrollEvent};

use crate::constants::{
    ASPECT_COMPENSATION, INERTIA_DECAY_PER_MS, INERTIA_MIN_VELOCITY, INERTIA_START_VELOCITY,
    INERTIA_VELOCITY_SCALE, NOMINAL_FRAME_INTERVAL_MS,
};
use crate::zone::Axis;

/// Result of one inertia tick.
#[derive(Debug, Default)]
pub struct InertiaStep {
    pub event: Option<ScrollEvent>,
    /// The coast-down finished on this tick; the caller should stop the
    /// frame clock.
    pub finished: bool,
}

/// Frame-clock-driven exponential decay emitter.
#[derive(Debug, Default)]
pub struct InertiaEngine {
    vel_x: f64,
    vel_y: f64,
    last_tick: Option<f64>,
    momentum_began: bool,
    scrolling: bool,
}

impl InertiaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.scrolling
    }

    /// Starts coasting from the session's average lift-off velocity.
    ///
    /// Velocities are normalized units per second; only the zone's own axis
    /// coasts, the other is zeroed. Returns false (and stays idle) below the
    /// start threshold.
    pub fn begin(&mut self, axis: Axis, avg_velocity: (f32, f32), multiplier: f32) -> bool {
        let (vel_x, vel_y) = match axis {
            Axis::Vertical => (
                0.0,
                (-avg_velocity.1 * multiplier * INERTIA_VELOCITY_SCALE) as f64,
            ),
            Axis::Horizontal => (
                (avg_velocity.0 * multiplier * INERTIA_VELOCITY_SCALE * ASPECT_COMPENSATION)
                    as f64,
                0.0,
            ),
        };
        let axis_speed = match axis {
            Axis::Vertical => vel_y.abs(),
            Axis::Horizontal => vel_x.abs(),
        };
        if axis_speed <= INERTIA_START_VELOCITY as f64 {
            return false;
        }
        self.vel_x = vel_x;
        self.vel_y = vel_y;
        self.last_tick = None;
        self.momentum_began = false;
        self.scrolling = true;
        true
    }

    /// One frame-clock tick. No-op once the session has ended.
    pub fn on_tick(&mut self, timestamp: f64) -> InertiaStep {
        if !self.scrolling {
            return InertiaStep::default();
        }

        let interval_ms = match self.last_tick {
            Some(last) => ((timestamp - last) * 1000.0).max(0.0),
            None => NOMINAL_FRAME_INTERVAL_MS,
        };
        self.last_tick = Some(timestamp);

        let decay = INERTIA_DECAY_PER_MS.powf(interval_ms);
        self.vel_x *= decay;
        self.vel_y *= decay;

        if self.vel_x.abs() < INERTIA_MIN_VELOCITY as f64
            && self.vel_y.abs() < INERTIA_MIN_VELOCITY as f64
        {
            let event = self.momentum_began.then(ScrollEvent::momentum_ended);
            self.clear();
            return InertiaStep {
                event,
                finished: true,
            };
        }

        let phase = if self.momentum_began {
            MomentumPhase::Changed
        } else {
            MomentumPhase::Began
        };
        self.momentum_began = true;
        InertiaStep {
            event: Some(ScrollEvent::momentum(
                self.vel_x as i32,
                self.vel_y as i32,
                phase,
            )),
            finished: false,
        }
    }

    /// Cancels the coast-down; returns the momentum-ended event to post if
    /// one was in progress.
    pub fn stop(&mut self) -> Option<ScrollEvent> {
        if !self.scrolling {
            return None;
        }
        let event = self.momentum_began.then(ScrollEvent::momentum_ended);
        self.clear();
        event
    }

    fn clear(&mut self) {
        self.vel_x = 0.0;
        self.vel_y = 0.0;
        self.last_tick = None;
        self.momentum_began = false;
        self.scrolling = false;
    }
}
