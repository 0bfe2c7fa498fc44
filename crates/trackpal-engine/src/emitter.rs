//! Scroll event synthesis.
//!
//! Raw normalized deltas are shaped by the acceleration curve, scaled into
//! pixels with the user multiplier, and accumulated per axis; only whole
//! pixels are emitted, with the fractional remainder carried in the session
//! accumulator so slow drags still add up to motion. Vertical zones follow
//! natural-scroll conventions (content moves with the finger); horizontal
//! zones additionally carry the aspect compensation.

use trackpal_core::config::{AccelerationCurve, EngineConfig};
use trackpal_core::events::ScrollEvent;

use crate::constants::{ASPECT_COMPENSATION, SCROLL_PIXEL_SCALE};
use crate::session::TouchSession;
use crate::zone::Axis;

/// Applies the configured acceleration curve componentwise.
pub fn apply_curve(curve: AccelerationCurve, delta: (f32, f32)) -> (f32, f32) {
    fn shape(curve: AccelerationCurve, d: f32) -> f32 {
        match curve {
            AccelerationCurve::Linear => d,
            AccelerationCurve::Quadratic => d * d.abs(),
            AccelerationCurve::Cubic => d * d * d,
            AccelerationCurve::Ease => {
                let t = (d.abs() * 10.0).clamp(0.0, 1.0);
                let smooth = t * t * (3.0 - 2.0 * t);
                d * (0.5 + smooth * 0.5)
            }
        }
    }
    (shape(curve, delta.0), shape(curve, delta.1))
}

/// Accumulates one post-activation delta and returns the event to emit, if
/// any whole pixels are ready.
///
/// The accumulator keeps `|fraction| < 1` per axis after every emission.
pub fn accumulate(
    session: &mut TouchSession,
    axis: Axis,
    delta: (f32, f32),
    config: &EngineConfig,
) -> Option<ScrollEvent> {
    let adjusted = apply_curve(config.acceleration_curve, delta);
    match axis {
        Axis::Vertical => {
            // Natural scroll: finger down means content down, wheel up.
            session.scroll_accumulator.1 +=
                (-adjusted.1 * config.scroll_multiplier * SCROLL_PIXEL_SCALE) as f64;
        }
        Axis::Horizontal => {
            session.scroll_accumulator.0 += (adjusted.0
                * config.scroll_multiplier
                * SCROLL_PIXEL_SCALE
                * ASPECT_COMPENSATION) as f64;
        }
    }

    let sx = session.scroll_accumulator.0.trunc();
    let sy = session.scroll_accumulator.1.trunc();
    if sx == 0.0 && sy == 0.0 {
        return None;
    }
    session.scroll_accumulator.0 -= sx;
    session.scroll_accumulator.1 -= sy;
    Some(ScrollEvent::pixels(sx as i32, sy as i32))
}

/// Flushes the buffered activation deltas with a linear ramp.
///
/// Delta `i` of `n` is scaled by `(i + 1) / (n + 1)` so the first emitted
/// burst eases in instead of jumping the view by the whole buffered distance.
pub fn flush_buffered(
    session: &mut TouchSession,
    axis: Axis,
    config: &EngineConfig,
) -> Vec<ScrollEvent> {
    let deltas: Vec<(f32, f32)> = session.activation.deltas.iter().copied().collect();
    let n = deltas.len();
    let mut events = Vec::new();
    for (i, delta) in deltas.into_iter().enumerate() {
        let ramp = (i + 1) as f32 / (n + 1) as f32;
        let ramped = (delta.0 * ramp, delta.1 * ramp);
        if let Some(event) = accumulate(session, axis, ramped, config) {
            events.push(event);
        }
    }
    events
}
