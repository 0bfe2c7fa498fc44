//! Plain-data types and capability seams for the TrackPal engine.
//!
//! Nothing in this crate makes gesture decisions. It defines the contact
//! frames the raw multitouch source produces, the configuration schema, the
//! synthesized and intercepted event types, the main-queue channel producers
//! post into, the two mutex-guarded cross-thread flags, and the traits the
//! host implements to connect the engine to the operating system.

pub mod capabilities;
pub mod clock;
pub mod config;
pub mod contact;
pub mod events;
pub mod runtime;
pub mod store;

pub use capabilities::{
    EventSink, FrameClock, FrameSubscription, SettingValue, SettingsStore, TapControl,
};
pub use clock::IntervalFrameClock;
pub use config::{
    AccelerationCurve, Corner, CornerAction, EngineConfig, HorizontalPosition, VerticalEdgeMode,
};
pub use contact::{ContactFrame, ContactState};
pub use events::{
    MomentumPhase, NativeEvent, ScrollEvent, ScrollEventPhase, SyntheticEvent, TapVerdict,
    TRACKPAL_EVENT_TAG,
};
pub use runtime::{engine_queue, EngineInbox, EngineMessage, EngineQueue, SharedFlags};
pub use store::JsonFileStore;
