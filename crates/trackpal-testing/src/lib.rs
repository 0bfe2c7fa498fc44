//! Test harness for the TrackPal engine.
//!
//! Lets tests run the full pipeline against scripted input without a
//! trackpad: build strokes with [`TouchStroke`], feed them through
//! [`EngineHarness`], and assert on the recorded synthetic event stream.
//!
//! # Example
//!
//! ```
//! use trackpal_testing::{EngineHarness, TouchStroke};
//!
//! let mut harness = EngineHarness::new();
//! harness.play(&TouchStroke::new((0.95, 0.5), (0.95, 0.35), 5));
//! let (_, dy) = harness.sink.total_pixels();
//! assert!(dy > 0);
//! ```

pub mod frames;
pub mod harness;

pub use frames::{TouchStroke, DEFAULT_FPS};
pub use harness::{
    CountingTap, EngineHarness, ManualFrameClock, MemoryStore, RecordingSink,
};
