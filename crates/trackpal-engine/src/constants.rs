//! Shared tuning constants for the touch-intent pipeline.
//!
//! These thresholds are intentionally kept in one place so the activation,
//! emission, and inertia stages stay mutually consistent. Positions and
//! distances are in normalized trackpad units unless noted; times are seconds.

/// Horizontal deltas are scaled by this before any axis comparison or
/// emission. Precision trackpads are roughly 1.6:1, so an uncompensated
/// horizontal swipe reads ~40% slower than the same finger travel vertically.
pub const ASPECT_COMPENSATION: f32 = 1.6;

// ============================================================================
// Activation evidence
// ============================================================================

/// Base confidence for a touch starting exactly on a zone's inner boundary.
pub const ZONE_PRIOR_BASE: f32 = 0.50;

/// Additional confidence for a touch starting at the zone's deepest point.
pub const ZONE_PRIOR_DEPTH_GAIN: f32 = 0.35;

/// Frame deltas with total movement below this carry no direction evidence.
pub const EVIDENCE_MOVEMENT_EPSILON: f32 = 0.0005;

/// Confidence at which a stationary frame still counts as activated.
pub const STATIONARY_ACTIVATION_CONFIDENCE: f32 = 0.80;

/// Half-width of the no-evidence band around the learned direction center.
pub const DIRECTION_DEAD_ZONE: f32 = 0.05;

/// Gain applied to on-axis ratios above the dead zone.
pub const ON_AXIS_GAIN: f32 = 0.275;

/// Gain applied to on-axis ratios below the dead zone. Slightly weaker than
/// the positive gain so one off-axis wobble cannot cancel a clean frame.
pub const OFF_AXIS_PENALTY_GAIN: f32 = 0.25;

/// Step thresholds for the on-axis speed boost, normalized units per second.
pub const VELOCITY_BOOST_STEPS: [(f32, f32); 3] = [(0.30, 0.10), (0.15, 0.05), (0.05, 0.02)];

/// Density below this contributes the minimum quality weight.
pub const QUALITY_DENSITY_FLOOR: f32 = 0.02;

/// Density span over which quality weight ramps from floor to full.
pub const QUALITY_DENSITY_RANGE: f32 = 0.08;

/// Quality weight never falls below this; a light but plausible touch still
/// accumulates some evidence.
pub const QUALITY_WEIGHT_FLOOR: f32 = 0.30;

/// Largest confidence loss a single frame may inflict.
pub const MAX_FRAME_PENALTY: f32 = -0.20;

/// Baseline activation threshold before any retry bonus.
pub const BASE_ACTIVATION_THRESHOLD: f32 = 0.75;

/// The retry bonus can never lower the threshold past this.
pub const MIN_ACTIVATION_THRESHOLD: f32 = 0.67;

/// Confidence at or below which the touch is released to cursor motion.
pub const REJECTION_CONFIDENCE: f32 = 0.20;

/// Evidence frames allowed before an undecided activation is forced to
/// reject. Sits inside the 6..=8 band the early-evidence window allows.
pub const ACTIVATION_MAX_FRAMES: usize = 7;

/// Off-axis speed more than this multiple of on-axis speed vetoes a
/// horizontal-zone activation within the first frames.
pub const OFF_AXIS_VETO_RATIO: f32 = 1.5;

/// The off-axis veto only applies within this many evidence frames.
pub const OFF_AXIS_VETO_FRAME_LIMIT: usize = 3;

/// Horizontal zones reject outright below this on-axis ratio after two
/// evidence frames.
pub const HORIZONTAL_MIN_ON_AXIS_RATIO: f32 = 0.35;

// ============================================================================
// Corners
// ============================================================================

/// Total buffered movement beyond which a corner touch is a slide, not a tap,
/// and gets promoted to an adjacent scroll edge.
pub const CORNER_PROMOTION_MOVEMENT: f32 = 0.003;

/// Horizontal movement is weighted by this when picking the promotion edge at
/// bottom/top corners; edge sensor noise inflates Y there.
pub const CORNER_HORIZONTAL_BIAS: f32 = 1.5;

// ============================================================================
// Emission
// ============================================================================

/// Normalized-delta to pixel conversion before the user multiplier.
pub const SCROLL_PIXEL_SCALE: f32 = 100.0;

/// Middle-click taps allow at most this much total normalized movement.
pub const MIDDLE_CLICK_TAP_SLOP: f32 = 0.01;

// ============================================================================
// Finger counting
// ============================================================================

/// Single-finger frames are discarded for this long after a multi-to-single
/// transition, so system gesture tails cannot leak into a new session.
pub const MULTI_TO_SINGLE_DEBOUNCE: f64 = 0.150;

// ============================================================================
// Velocity and inertia
// ============================================================================

/// Bounded velocity history length per session.
pub const VELOCITY_HISTORY_LEN: usize = 5;

/// Scroll-scaled axis velocity needed at lift-off to start coasting.
pub const INERTIA_START_VELOCITY: f32 = 20.0;

/// Normalized velocity to scroll velocity conversion at lift-off.
pub const INERTIA_VELOCITY_SCALE: f32 = 20.0;

/// Both axes below this scroll velocity ends the coast-down.
pub const INERTIA_MIN_VELOCITY: f32 = 2.0;

/// Per-millisecond exponential friction factor (≈0.968 per 60 Hz frame).
pub const INERTIA_DECAY_PER_MS: f64 = 0.998;

/// Frame interval assumed for the first tick, before a real delta exists.
pub const NOMINAL_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

// ============================================================================
// Learning
// ============================================================================

/// EMA factor for the learned direction centers.
pub const DIRECTION_CENTER_ALPHA: f32 = 0.02;

/// Ratio samples required before one EMA step is applied.
pub const DIRECTION_CENTER_MIN_SAMPLES: usize = 5;

/// Legal range of the learned direction centers.
pub const DIRECTION_CENTER_RANGE: (f32, f32) = (0.40, 0.55);

/// Default learned direction center.
pub const DIRECTION_CENTER_DEFAULT: f32 = 0.50;

/// Retry bonus ceiling.
pub const RETRY_BONUS_MAX: f32 = 0.08;

/// Multiplier from retry rate to retry bonus.
pub const RETRY_BONUS_RATE_GAIN: f32 = 0.10;

/// Retry-bonus decay factor applied on every successful activation.
pub const RETRY_BONUS_DECAY: f32 = 0.995;

/// A new session within this many seconds of a miss in the same zone
/// category counts as a retry.
pub const RETRY_WINDOW: f64 = 2.0;

/// Minimum retry + miss events before the bonus is recomputed.
pub const RETRY_MIN_EVENTS: u32 = 5;

/// Minimum retry rate before any bonus is granted.
pub const RETRY_RATE_THRESHOLD: f32 = 0.30;

/// Retry/miss counters are halved once a side's total exceeds this.
pub const COUNTER_HALVING_LIMIT: u32 = 1000;

/// Adaptive state is persisted after this many learning events.
pub const PERSIST_EVERY_EVENTS: u32 = 20;

// ============================================================================
// Session recording
// ============================================================================

/// Completed sessions kept for diagnostics and threshold learning.
pub const SESSION_HISTORY_LEN: usize = 50;

/// A session shorter than this duration...
pub const FALSE_ACTIVATION_MAX_DURATION: f64 = 0.3;

/// ...and shorter than this total distance, not cancelled, is a false
/// activation.
pub const FALSE_ACTIVATION_MAX_DISTANCE: f32 = 0.05;
