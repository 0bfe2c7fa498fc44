//! Fallback real-time frame clock.
//!
//! Hosts with a display-link API should implement [`FrameClock`] over it; this
//! thread-based interval clock exists so the engine can coast inertia on
//! platforms (and integration tests) without one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use web_time::Instant;

use crate::capabilities::{FrameClock, FrameSubscription};
use crate::runtime::{EngineMessage, EngineQueue};

/// Posts [`EngineMessage::InertiaTick`] at a fixed interval from a worker
/// thread. Timestamps are monotonic seconds from the clock's own epoch.
pub struct IntervalFrameClock {
    interval: Duration,
}

impl IntervalFrameClock {
    /// A clock ticking at the given display refresh rate.
    pub fn with_refresh_rate(hz: f64) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / hz.max(1.0)),
        }
    }
}

impl Default for IntervalFrameClock {
    fn default() -> Self {
        Self::with_refresh_rate(60.0)
    }
}

impl FrameClock for IntervalFrameClock {
    fn start(&self, queue: EngineQueue) -> FrameSubscription {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        let interval = self.interval;

        thread::spawn(move || {
            let epoch = Instant::now();
            while !stop_for_thread.load(Ordering::Relaxed) {
                thread::sleep(interval);
                queue.post(EngineMessage::InertiaTick {
                    timestamp: epoch.elapsed().as_secs_f64(),
                });
            }
        });

        FrameSubscription::new(move || {
            stop.store(true, Ordering::Relaxed);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::engine_queue;

    #[test]
    fn test_ticks_arrive_and_stop_on_cancel() {
        let (queue, inbox) = engine_queue();
        let clock = IntervalFrameClock::with_refresh_rate(500.0);
        let subscription = clock.start(queue);

        // Wait for at least one tick.
        let mut saw_tick = false;
        for _ in 0..100 {
            if let Some(EngineMessage::InertiaTick { .. }) = inbox.try_recv() {
                saw_tick = true;
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert!(saw_tick, "expected at least one tick");

        subscription.cancel();
        // Drain anything in flight, then verify the stream dries up.
        thread::sleep(Duration::from_millis(20));
        while inbox.try_recv().is_some() {}
        thread::sleep(Duration::from_millis(20));
        assert!(inbox.try_recv().is_none());
    }
}
