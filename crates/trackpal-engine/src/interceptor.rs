//! Native event interception.
//!
//! A second handle on the system event stream watches scroll and mouse-moved
//! events at the HID insertion point. While the engine owns scrolling, native
//! scroll events (which would double-scroll) and cursor motion (which would
//! drift the pointer mid-gesture) are dropped; the engine's own tagged events
//! always pass.
//!
//! The filter runs synchronously on the OS callback thread. It reads only the
//! shared flags and must never call into main-queue state; the decision has
//! to land within the callback.

use std::sync::Arc;

use trackpal_core::capabilities::TapControl;
use trackpal_core::events::{NativeEvent, TapVerdict, TRACKPAL_EVENT_TAG};
use trackpal_core::runtime::SharedFlags;

/// `Send + Clone` pass/drop filter handed to the event-tap callback.
#[derive(Clone)]
pub struct InterceptorFilter {
    flags: SharedFlags,
    tap: Arc<dyn TapControl>,
}

impl InterceptorFilter {
    pub fn new(flags: SharedFlags, tap: Arc<dyn TapControl>) -> Self {
        Self { flags, tap }
    }

    /// Decides one native event. Tap-disabled notifications re-enable the
    /// tap inline and pass through with no state reset.
    pub fn decide(&self, event: &NativeEvent) -> TapVerdict {
        match event {
            NativeEvent::TapDisabled { by_timeout } => {
                log::warn!(
                    "event tap disabled ({}), re-enabling",
                    if *by_timeout { "timeout" } else { "user input" }
                );
                self.tap.re_enable();
                TapVerdict::Pass
            }
            NativeEvent::Scroll { user_tag } => {
                if self.flags.actively_scrolling() && *user_tag != Some(TRACKPAL_EVENT_TAG) {
                    TapVerdict::Drop
                } else {
                    TapVerdict::Pass
                }
            }
            NativeEvent::MouseMoved => {
                if self.flags.actively_scrolling() {
                    TapVerdict::Drop
                } else {
                    TapVerdict::Pass
                }
            }
        }
    }
}
