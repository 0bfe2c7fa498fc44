//! On-line adaptation of the activation thresholds.
//!
//! Two mechanisms, both persisted:
//!
//! - The learned **direction centers** shift the neutral point of the
//!   on-axis-ratio evidence toward how this user actually swipes, via a slow
//!   EMA over the ratios of successful activations.
//! - The **retry bonus** lowers the activation threshold on an axis when the
//!   user keeps retrying shortly after misses there; repeated retries mean
//!   the threshold is too strict for them.

use trackpal_core::capabilities::SettingsStore;

use crate::constants::{
    COUNTER_HALVING_LIMIT, DIRECTION_CENTER_ALPHA, DIRECTION_CENTER_DEFAULT,
    DIRECTION_CENTER_MIN_SAMPLES, DIRECTION_CENTER_RANGE, PERSIST_EVERY_EVENTS, RETRY_BONUS_DECAY,
    RETRY_BONUS_MAX, RETRY_BONUS_RATE_GAIN, RETRY_MIN_EVENTS, RETRY_RATE_THRESHOLD, RETRY_WINDOW,
};
use crate::zone::Axis;

/// Persisted key names for the adaptive state.
pub mod keys {
    pub const DIR_CENTER_H: &str = "adaptive_dirCenterH";
    pub const DIR_CENTER_V: &str = "adaptive_dirCenterV";
    pub const RETRY_COUNT_H: &str = "adaptive_retryCountH";
    pub const RETRY_COUNT_V: &str = "adaptive_retryCountV";
    pub const MISS_COUNT_H: &str = "adaptive_missCountH";
    pub const MISS_COUNT_V: &str = "adaptive_missCountV";
    pub const RETRY_BONUS_H: &str = "adaptive_retryBonusH";
    pub const RETRY_BONUS_V: &str = "adaptive_retryBonusV";
}

/// Per-axis adaptive state.
#[derive(Debug, Clone)]
struct AxisState {
    direction_center: f32,
    retry_count: u32,
    miss_count: u32,
    retry_bonus: f32,
    /// On-axis ratios of recent successful activations, drained into the EMA
    /// once enough have accumulated.
    ratio_samples: Vec<f32>,
}

impl Default for AxisState {
    fn default() -> Self {
        Self {
            direction_center: DIRECTION_CENTER_DEFAULT,
            retry_count: 0,
            miss_count: 0,
            retry_bonus: 0.0,
            ratio_samples: Vec::new(),
        }
    }
}

impl AxisState {
    fn clamp_ranges(&mut self) {
        let (lo, hi) = DIRECTION_CENTER_RANGE;
        self.direction_center = self.direction_center.clamp(lo, hi);
        self.retry_bonus = self.retry_bonus.clamp(0.0, RETRY_BONUS_MAX);
    }

    fn halve_counters_if_needed(&mut self) {
        if self.retry_count + self.miss_count > COUNTER_HALVING_LIMIT {
            self.retry_count /= 2;
            self.miss_count /= 2;
        }
    }

    fn recompute_retry_bonus(&mut self) {
        let total = self.retry_count + self.miss_count;
        if total < RETRY_MIN_EVENTS {
            return;
        }
        let rate = self.retry_count as f32 / total as f32;
        if rate > RETRY_RATE_THRESHOLD {
            self.retry_bonus = (rate * RETRY_BONUS_RATE_GAIN).min(RETRY_BONUS_MAX);
        }
    }
}

/// EMA direction centers plus retry-bonus counters, persisted across runs.
#[derive(Debug, Default)]
pub struct AdaptiveLearner {
    horizontal: AxisState,
    vertical: AxisState,
    /// Zone category and timestamp of the most recent activation failure.
    last_miss: Option<(Axis, f64)>,
    events_since_persist: u32,
}

impl AdaptiveLearner {
    pub fn new() -> Self {
        Self::default()
    }

    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }

    /// Neutral point for on-axis-ratio evidence on this axis.
    pub fn direction_center(&self, axis: Axis) -> f32 {
        self.axis(axis).direction_center
    }

    /// Current activation-threshold reduction for this axis.
    pub fn retry_bonus(&self, axis: Axis) -> f32 {
        self.axis(axis).retry_bonus
    }

    /// Called when a scroll-zone session starts. A start shortly after a miss
    /// of the same zone category counts as a retry.
    pub fn on_session_start(&mut self, axis: Axis, timestamp: f64) {
        if let Some((miss_axis, miss_at)) = self.last_miss {
            if miss_axis == axis && timestamp - miss_at <= RETRY_WINDOW {
                let state = self.axis_mut(axis);
                state.retry_count += 1;
                state.halve_counters_if_needed();
                state.recompute_retry_bonus();
                self.last_miss = None;
            }
        }
    }

    /// Called with the buffered on-axis ratios of a successful activation.
    pub fn on_successful_activation(&mut self, axis: Axis, ratios: &[f32]) {
        let state = self.axis_mut(axis);
        state.ratio_samples.extend_from_slice(ratios);
        if state.ratio_samples.len() >= DIRECTION_CENTER_MIN_SAMPLES {
            let mean =
                state.ratio_samples.iter().sum::<f32>() / state.ratio_samples.len() as f32;
            state.direction_center = state.direction_center * (1.0 - DIRECTION_CENTER_ALPHA)
                + mean * DIRECTION_CENTER_ALPHA;
            state.ratio_samples.clear();
        }
        state.retry_bonus *= RETRY_BONUS_DECAY;
        state.clamp_ranges();
        self.events_since_persist += 1;
    }

    /// Called on rejection or frame-budget timeout.
    pub fn on_activation_failure(&mut self, axis: Axis, timestamp: f64) {
        self.last_miss = Some((axis, timestamp));
        let state = self.axis_mut(axis);
        state.miss_count += 1;
        state.halve_counters_if_needed();
        self.events_since_persist += 1;
    }

    /// True once enough learning events have accumulated that the engine
    /// should persist; resets the event counter.
    pub fn take_persist_due(&mut self) -> bool {
        if self.events_since_persist >= PERSIST_EVERY_EVENTS {
            self.events_since_persist = 0;
            true
        } else {
            false
        }
    }

    /// Loads persisted state, clamping every value to its legal range.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut learner = Self::default();
        if let Some(v) = store.get_f32(keys::DIR_CENTER_H) {
            learner.horizontal.direction_center = v;
        }
        if let Some(v) = store.get_f32(keys::DIR_CENTER_V) {
            learner.vertical.direction_center = v;
        }
        if let Some(v) = store.get_u32(keys::RETRY_COUNT_H) {
            learner.horizontal.retry_count = v;
        }
        if let Some(v) = store.get_u32(keys::RETRY_COUNT_V) {
            learner.vertical.retry_count = v;
        }
        if let Some(v) = store.get_u32(keys::MISS_COUNT_H) {
            learner.horizontal.miss_count = v;
        }
        if let Some(v) = store.get_u32(keys::MISS_COUNT_V) {
            learner.vertical.miss_count = v;
        }
        if let Some(v) = store.get_f32(keys::RETRY_BONUS_H) {
            learner.horizontal.retry_bonus = v;
        }
        if let Some(v) = store.get_f32(keys::RETRY_BONUS_V) {
            learner.vertical.retry_bonus = v;
        }
        learner.horizontal.clamp_ranges();
        learner.vertical.clamp_ranges();
        learner
    }

    pub fn save(&self, store: &mut dyn SettingsStore) {
        store.set_f32(keys::DIR_CENTER_H, self.horizontal.direction_center);
        store.set_f32(keys::DIR_CENTER_V, self.vertical.direction_center);
        store.set_u32(keys::RETRY_COUNT_H, self.horizontal.retry_count);
        store.set_u32(keys::RETRY_COUNT_V, self.vertical.retry_count);
        store.set_u32(keys::MISS_COUNT_H, self.horizontal.miss_count);
        store.set_u32(keys::MISS_COUNT_V, self.vertical.miss_count);
        store.set_f32(keys::RETRY_BONUS_H, self.horizontal.retry_bonus);
        store.set_f32(keys::RETRY_BONUS_V, self.vertical.retry_bonus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackpal_core::capabilities::SettingValue;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        values: HashMap<String, SettingValue>,
    }

    impl SettingsStore for MapStore {
        fn get(&self, key: &str) -> Option<SettingValue> {
            self.values.get(key).cloned()
        }
        fn set(&mut self, key: &str, value: SettingValue) {
            self.values.insert(key.to_owned(), value);
        }
        fn remove(&mut self, key: &str) {
            self.values.remove(key);
        }
        fn flush(&mut self) {}
    }

    #[test]
    fn test_ema_moves_center_toward_samples_and_clamps() {
        let mut learner = AdaptiveLearner::new();
        // Heavily on-axis user: ratios near 1.0 pull the center up, but the
        // clamp holds at 0.55.
        for _ in 0..200 {
            learner.on_successful_activation(Axis::Vertical, &[0.95; 5]);
        }
        let center = learner.direction_center(Axis::Vertical);
        assert!(center > DIRECTION_CENTER_DEFAULT);
        assert!(center <= DIRECTION_CENTER_RANGE.1);
    }

    #[test]
    fn test_ema_waits_for_enough_samples() {
        let mut learner = AdaptiveLearner::new();
        learner.on_successful_activation(Axis::Horizontal, &[0.9, 0.9]);
        assert_eq!(
            learner.direction_center(Axis::Horizontal),
            DIRECTION_CENTER_DEFAULT
        );
        learner.on_successful_activation(Axis::Horizontal, &[0.9, 0.9, 0.9]);
        assert!(learner.direction_center(Axis::Horizontal) > DIRECTION_CENTER_DEFAULT);
    }

    #[test]
    fn test_retry_pattern_earns_bonus() {
        let mut learner = AdaptiveLearner::new();
        // Miss then immediately retry, five times over.
        let mut t = 0.0;
        for _ in 0..5 {
            learner.on_activation_failure(Axis::Horizontal, t);
            learner.on_session_start(Axis::Horizontal, t + 0.5);
            t += 3.0;
        }
        let bonus = learner.retry_bonus(Axis::Horizontal);
        assert!(bonus > 0.0);
        assert!(bonus <= RETRY_BONUS_MAX);
        // The other axis is untouched.
        assert_eq!(learner.retry_bonus(Axis::Vertical), 0.0);
    }

    #[test]
    fn test_late_retry_does_not_count() {
        let mut learner = AdaptiveLearner::new();
        for _ in 0..10 {
            learner.on_activation_failure(Axis::Vertical, 0.0);
            // Way past the retry window.
            learner.on_session_start(Axis::Vertical, 10.0);
        }
        assert_eq!(learner.retry_bonus(Axis::Vertical), 0.0);
    }

    #[test]
    fn test_bonus_decays_on_success() {
        let mut learner = AdaptiveLearner::new();
        learner.horizontal.retry_bonus = RETRY_BONUS_MAX;
        learner.on_successful_activation(Axis::Horizontal, &[0.5]);
        assert!(learner.retry_bonus(Axis::Horizontal) < RETRY_BONUS_MAX);
    }

    #[test]
    fn test_counters_halve_past_limit() {
        let mut learner = AdaptiveLearner::new();
        learner.vertical.miss_count = COUNTER_HALVING_LIMIT;
        learner.on_activation_failure(Axis::Vertical, 0.0);
        assert_eq!(learner.vertical.miss_count, (COUNTER_HALVING_LIMIT + 1) / 2);
    }

    #[test]
    fn test_round_trip_with_clamping() {
        let mut store = MapStore::default();
        store.set_f32(keys::DIR_CENTER_H, 0.9); // out of range
        store.set_f32(keys::RETRY_BONUS_V, -1.0); // out of range
        store.set_u32(keys::MISS_COUNT_H, 7);

        let learner = AdaptiveLearner::load(&store);
        assert_eq!(
            learner.direction_center(Axis::Horizontal),
            DIRECTION_CENTER_RANGE.1
        );
        assert_eq!(learner.retry_bonus(Axis::Vertical), 0.0);
        assert_eq!(learner.horizontal.miss_count, 7);

        let mut second = MapStore::default();
        learner.save(&mut second);
        let reloaded = AdaptiveLearner::load(&second);
        assert_eq!(
            reloaded.direction_center(Axis::Horizontal),
            learner.direction_center(Axis::Horizontal)
        );
        assert_eq!(reloaded.horizontal.miss_count, 7);
    }

    #[test]
    fn test_persist_cadence() {
        let mut learner = AdaptiveLearner::new();
        for _ in 0..PERSIST_EVERY_EVENTS - 1 {
            learner.on_successful_activation(Axis::Vertical, &[0.5]);
            assert!(!learner.take_persist_due());
        }
        learner.on_successful_activation(Axis::Vertical, &[0.5]);
        assert!(learner.take_persist_due());
        assert!(!learner.take_persist_due());
    }
}
