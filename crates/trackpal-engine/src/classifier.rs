//! Per-frame contact plausibility classification.
//!
//! Stateless: each frame is judged on its own geometry and pressure density.
//! Lift-off frames bypass classification entirely because density collapses
//! to zero on release and would read as a hover.

use trackpal_core::config::EngineConfig;
use trackpal_core::contact::ContactFrame;

/// Classifier verdict for one contact frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchVerdict {
    Valid,
    /// Density below the light-touch threshold: hover or grazing palm edge.
    TooLight,
    /// Contact ellipse larger than a finger: palm or thumb heel.
    TooLarge,
}

/// Running verdict counters, kept for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounters {
    pub too_light: u64,
    pub too_large: u64,
}

impl FilterCounters {
    pub fn note(&mut self, verdict: TouchVerdict) {
        match verdict {
            TouchVerdict::TooLight => self.too_light += 1,
            TouchVerdict::TooLarge => self.too_large += 1,
            TouchVerdict::Valid => {}
        }
    }
}

/// Classifies one frame against the configured filters.
pub fn classify(frame: &ContactFrame, config: &EngineConfig) -> TouchVerdict {
    if frame.state.is_lifting() {
        return TouchVerdict::Valid;
    }
    if config.filter_light_touches && frame.density < config.light_touch_density_threshold {
        return TouchVerdict::TooLight;
    }
    if config.filter_large_touches
        && (frame.major_axis > config.large_touch_major_axis_threshold
            || frame.minor_axis > config.large_touch_minor_axis_threshold)
    {
        return TouchVerdict::TooLarge;
    }
    TouchVerdict::Valid
}
