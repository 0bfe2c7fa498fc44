//! Single- vs. multi-finger arbitration.
//!
//! The native driver owns multi-finger gestures; this engine only ever acts
//! on single-finger contact. The arbiter tracks the finger-count mode across
//! frames and debounces the multi→single transition, because system gesture
//! tails keep delivering one-finger frames for a short while after the second
//! finger lifts.

use crate::constants::MULTI_TO_SINGLE_DEBOUNCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    SingleFinger,
    MultiFinger,
}

/// What the engine must do in response to a finger-count change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerTransition {
    None,
    /// Went from one finger to several: cancel any active scroll session.
    EnteredMulti,
    /// All fingers left the surface.
    AllReleased,
}

#[derive(Debug, Default)]
pub struct FingerCountArbiter {
    mode: GestureMode,
    multi_to_single_at: Option<f64>,
}

impl FingerCountArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    /// Feeds one frame's finger count; returns the action the engine owes.
    pub fn observe(&mut self, finger_count: u32, timestamp: f64) -> FingerTransition {
        let previous = self.mode;
        self.mode = match finger_count {
            0 => GestureMode::Idle,
            1 => GestureMode::SingleFinger,
            _ => GestureMode::MultiFinger,
        };

        match (previous, self.mode) {
            (GestureMode::SingleFinger, GestureMode::MultiFinger) => FingerTransition::EnteredMulti,
            (GestureMode::MultiFinger, GestureMode::SingleFinger) => {
                self.multi_to_single_at = Some(timestamp);
                FingerTransition::None
            }
            (GestureMode::SingleFinger | GestureMode::MultiFinger, GestureMode::Idle) => {
                FingerTransition::AllReleased
            }
            _ => FingerTransition::None,
        }
    }

    /// False while in multi-finger mode, or within the debounce window after
    /// a multi-to-single transition.
    pub fn should_process_single_finger_touch(&self, timestamp: f64) -> bool {
        match self.mode {
            GestureMode::MultiFinger => false,
            GestureMode::SingleFinger => match self.multi_to_single_at {
                Some(at) => timestamp - at >= MULTI_TO_SINGLE_DEBOUNCE,
                None => true,
            },
            GestureMode::Idle => false,
        }
    }

    pub fn reset(&mut self) {
        self.mode = GestureMode::Idle;
        self.multi_to_single_at = None;
    }
}
