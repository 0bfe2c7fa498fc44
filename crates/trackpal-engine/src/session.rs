//! The one-at-a-time touch session.
//!
//! A session spans a single contiguous single-finger contact: created on the
//! first valid `start`/`contact` frame, destroyed by the engine's tracking
//! reset. Everything the activation, emission, and learning stages need about
//! the current touch lives here.

use smallvec::SmallVec;

use crate::constants::{ACTIVATION_MAX_FRAMES, VELOCITY_HISTORY_LEN};
use crate::recorder::SessionRecord;
use crate::zone::Zone;

/// One velocity sample in normalized units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    pub vx: f32,
    pub vy: f32,
    pub time: f64,
}

/// Bounded, strictly chronological velocity history.
#[derive(Debug, Default, Clone)]
pub struct VelocityHistory {
    samples: SmallVec<[VelocitySample; VELOCITY_HISTORY_LEN]>,
}

impl VelocityHistory {
    /// Appends a sample, evicting the oldest past the bound. Samples that do
    /// not advance time are dropped so the ordering invariant holds even when
    /// two frames land on the same device timestamp.
    pub fn push(&mut self, vx: f32, vy: f32, time: f64) {
        if let Some(last) = self.samples.last() {
            if time <= last.time {
                return;
            }
        }
        if self.samples.len() == VELOCITY_HISTORY_LEN {
            self.samples.remove(0);
        }
        self.samples.push(VelocitySample { vx, vy, time });
    }

    pub fn latest(&self) -> Option<VelocitySample> {
        self.samples.last().copied()
    }

    /// Mean of the retained samples; zero when empty.
    pub fn average(&self) -> (f32, f32) {
        if self.samples.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.samples.len() as f32;
        let (sx, sy) = self
            .samples
            .iter()
            .fold((0.0, 0.0), |(ax, ay), s| (ax + s.vx, ay + s.vy));
        (sx / n, sy / n)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Buffered early-touch evidence while the activation decision is pending.
#[derive(Debug, Default, Clone)]
pub struct ActivationState {
    /// True from session start until the evaluator decides.
    pub pending: bool,
    /// Raw positions of the buffered frames.
    pub frames: SmallVec<[(f32, f32); ACTIVATION_MAX_FRAMES]>,
    /// Frame-to-frame deltas, including the discarded first one.
    pub deltas: SmallVec<[(f32, f32); ACTIVATION_MAX_FRAMES]>,
    /// Densities aligned with `deltas`.
    pub densities: SmallVec<[f32; ACTIVATION_MAX_FRAMES]>,
    /// Accumulated activation confidence in `[0, 1]`.
    pub confidence: f32,
}

impl ActivationState {
    pub fn clear(&mut self) {
        self.pending = false;
        self.frames.clear();
        self.deltas.clear();
        self.densities.clear();
        self.confidence = 0.0;
    }

    /// Evidence frames seen so far (the discarded first delta not counted).
    pub fn evidence_frames(&self) -> usize {
        self.deltas.len().saturating_sub(1)
    }
}

/// State for one contiguous single-finger contact.
#[derive(Debug)]
pub struct TouchSession {
    pub zone: Zone,
    /// Zone before any corner promotion; restored on rejection so a corner
    /// tap can still fire at lift-off.
    pub original_zone: Zone,
    pub start_position: (f32, f32),
    pub start_time: f64,
    pub last_position: (f32, f32),
    pub last_time: f64,
    pub velocity_history: VelocityHistory,
    /// Fractional pixel remainders between emissions, `|value| < 1` after
    /// every emission.
    pub scroll_accumulator: (f64, f64),
    pub activation: ActivationState,
    /// Whether the zero-delta "began" event has been posted (and no "ended"
    /// yet).
    pub scroll_phase_began: bool,
    /// Recording of the scroll part of this session, once activated.
    pub record: Option<SessionRecord>,
    /// Total normalized path length since the first frame.
    pub total_movement: f32,
}

impl TouchSession {
    pub fn new(zone: Zone, position: (f32, f32), time: f64) -> Self {
        Self {
            zone,
            original_zone: zone,
            start_position: position,
            start_time: time,
            last_position: position,
            last_time: time,
            velocity_history: VelocityHistory::default(),
            scroll_accumulator: (0.0, 0.0),
            activation: ActivationState::default(),
            scroll_phase_began: false,
            record: None,
            total_movement: 0.0,
        }
    }

    /// True once the evaluator has activated scrolling for this session.
    pub fn is_scrolling(&self) -> bool {
        self.zone.is_scroll_zone() && !self.activation.pending && self.record.is_some()
    }

    pub fn duration(&self) -> f64 {
        self.last_time - self.start_time
    }
}
