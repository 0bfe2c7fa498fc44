//! The TrackPal touch intent engine.
//!
//! Turns a stream of raw single-finger contact frames into synthesized
//! edge-scroll, middle-click, and hot-corner events, with inertial
//! coast-down after lift-off and suppression of conflicting native events.
//!
//! # Pipeline
//!
//! 1. [`classifier`] filters each frame for plausibility (finger vs. palm
//!    vs. hover).
//! 2. [`zone`] maps the touch-down position to a zone label.
//! 3. [`arbiter`] gates processing on single-finger state.
//! 4. [`intent`] accumulates early-frame evidence into a confidence and
//!    decides scroll vs. release-to-cursor.
//! 5. [`emitter`] turns activated deltas into pixel-precise scroll events.
//! 6. [`inertia`] coasts the scroll down after lift-off.
//! 7. [`interceptor`] drops conflicting native scroll and cursor events.
//! 8. [`learner`] and [`recorder`] adapt thresholds to the user and persist.
//!
//! The [`engine::Engine`] value owns all of it; hosts connect the OS through
//! the capability traits in `trackpal-core`.

pub mod arbiter;
pub mod classifier;
pub mod constants;
pub mod emitter;
pub mod engine;
pub mod inertia;
pub mod intent;
pub mod interceptor;
pub mod learner;
pub mod recorder;
pub mod session;
pub mod zone;

pub use arbiter::{FingerCountArbiter, GestureMode};
pub use classifier::{classify, FilterCounters, TouchVerdict};
pub use engine::{Capabilities, Engine, EngineError};
pub use intent::IntentDecision;
pub use interceptor::InterceptorFilter;
pub use learner::AdaptiveLearner;
pub use recorder::{SessionRecord, SessionRecorder, ZoneThresholds};
pub use session::TouchSession;
pub use zone::{zone_at, Axis, Zone};

#[cfg(test)]
#[path = "tests/scenario_tests.rs"]
mod scenario_tests;

#[cfg(test)]
#[path = "tests/invariant_tests.rs"]
mod invariant_tests;
