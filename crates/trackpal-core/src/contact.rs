//! Raw multitouch contact frames.
//!
//! The raw multitouch callback hands the engine one of these per contact per
//! frame. Producers copy the primitive fields out of the OS-owned struct and
//! send the plain-data copy across the thread boundary; nothing here borrows
//! from the callback's input.

/// Lifecycle state of a single contact, decoded from the raw driver codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    /// Finger near the surface but not touching (raw code 1).
    Hover,
    /// First frame of a new contact (raw code 2).
    Start,
    /// Contact established, not yet moving (raw code 3).
    Contact,
    /// Contact moving (raw codes 4 and 5).
    Move,
    /// Contact lifting off (raw code 6). Density is unreliable from here on.
    Lifting,
    /// Contact fully released (raw code 7).
    Released,
}

impl ContactState {
    /// Decodes the raw driver lifecycle code.
    ///
    /// Unknown codes map to [`ContactState::Hover`], which the engine ignores,
    /// so a driver update that grows new states degrades to a no-op rather
    /// than a misclassification.
    pub fn from_raw(code: u8) -> Self {
        match code {
            2 => Self::Start,
            3 => Self::Contact,
            4 | 5 => Self::Move,
            6 => Self::Lifting,
            7 => Self::Released,
            _ => Self::Hover,
        }
    }

    /// True while the finger is on the surface (start, contact, or move).
    pub fn is_touching(self) -> bool {
        matches!(self, Self::Start | Self::Contact | Self::Move)
    }

    /// True once the finger begins leaving the surface.
    ///
    /// Density collapses to zero during lift-off, so these frames bypass the
    /// plausibility classifier.
    pub fn is_lifting(self) -> bool {
        matches!(self, Self::Lifting | Self::Released)
    }
}

/// One contact in one multitouch frame.
///
/// Positions are normalized to `[0, 1]` with the origin at the bottom-left of
/// the trackpad. `timestamp` is monotonic seconds from the device clock.
#[derive(Debug, Clone, Copy)]
pub struct ContactFrame {
    pub x: f32,
    pub y: f32,
    pub state: ContactState,
    /// Pressure density in `[0, 1]`. Near zero for hovers and palms barely
    /// grazing the surface.
    pub density: f32,
    /// Major axis of the contact ellipse, in device units.
    pub major_axis: f32,
    /// Minor axis of the contact ellipse, in device units.
    pub minor_axis: f32,
    /// Monotonic timestamp in seconds.
    pub timestamp: f64,
}

impl ContactFrame {
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes_round_trip() {
        assert_eq!(ContactState::from_raw(1), ContactState::Hover);
        assert_eq!(ContactState::from_raw(2), ContactState::Start);
        assert_eq!(ContactState::from_raw(3), ContactState::Contact);
        assert_eq!(ContactState::from_raw(4), ContactState::Move);
        assert_eq!(ContactState::from_raw(5), ContactState::Move);
        assert_eq!(ContactState::from_raw(6), ContactState::Lifting);
        assert_eq!(ContactState::from_raw(7), ContactState::Released);
    }

    #[test]
    fn test_unknown_code_is_hover() {
        assert_eq!(ContactState::from_raw(0), ContactState::Hover);
        assert_eq!(ContactState::from_raw(42), ContactState::Hover);
    }

    #[test]
    fn test_lifting_states_bypass_classification() {
        assert!(ContactState::Lifting.is_lifting());
        assert!(ContactState::Released.is_lifting());
        assert!(!ContactState::Move.is_lifting());
        assert!(ContactState::Move.is_touching());
        assert!(!ContactState::Hover.is_touching());
    }
}
