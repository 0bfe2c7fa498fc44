//! Scroll-session recording and false-activation learning.
//!
//! Every activated scroll session is recorded: how far it went, how fast, how
//! often it reversed, and the evidence snapshot it activated on. Completed
//! records feed per-zone advisory thresholds that tighten when the engine
//! keeps producing short, going-nowhere sessions (false activations) and
//! relax slowly otherwise. The thresholds are persisted and diagnosable but
//! do not gate the activation decision; the intent evaluator is the sole
//! gate.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trackpal_core::capabilities::SettingsStore;

use crate::constants::{
    FALSE_ACTIVATION_MAX_DISTANCE, FALSE_ACTIVATION_MAX_DURATION, SESSION_HISTORY_LEN,
};
use crate::zone::Zone;

/// Persisted key for the serialized threshold map.
pub const THRESHOLDS_KEY: &str = "adaptive_falseActivationThresholds";

/// Evidence snapshot taken at the moment of activation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivationSnapshot {
    pub on_axis_ratio: f32,
    pub off_axis_speed: f32,
    pub on_axis_speed: f32,
    pub density: f32,
    pub confidence: f32,
}

/// One recorded scroll session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub zone: Zone,
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub total_distance: f32,
    pub max_velocity: f32,
    pub direction_changes: u32,
    pub was_cancelled: bool,
    pub activation: ActivationSnapshot,
    last_delta: Option<(f32, f32)>,
}

impl SessionRecord {
    pub fn new(zone: Zone, start_time: f64, activation: ActivationSnapshot) -> Self {
        Self {
            zone,
            start_time,
            end_time: None,
            total_distance: 0.0,
            max_velocity: 0.0,
            direction_changes: 0,
            was_cancelled: false,
            activation,
            last_delta: None,
        }
    }

    /// Folds one post-activation delta and its speed into the record.
    pub fn note_delta(&mut self, delta: (f32, f32), speed: f32) {
        self.total_distance += (delta.0 * delta.0 + delta.1 * delta.1).sqrt();
        self.max_velocity = self.max_velocity.max(speed.abs());
        if let Some((px, py)) = self.last_delta {
            if px * delta.0 + py * delta.1 < 0.0 {
                self.direction_changes += 1;
            }
        }
        self.last_delta = Some(delta);
    }

    pub fn duration(&self) -> f64 {
        self.end_time.map(|end| end - self.start_time).unwrap_or(0.0)
    }

    /// A short session that went nowhere and was not cancelled is a
    /// mis-triggered scroll.
    pub fn is_false_activation(&self) -> bool {
        !self.was_cancelled
            && self.duration() < FALSE_ACTIVATION_MAX_DURATION
            && self.total_distance < FALSE_ACTIVATION_MAX_DISTANCE
    }
}

/// Advisory per-zone activation thresholds, learned from session history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    pub min_duration: f32,
    pub min_distance: f32,
    pub min_on_axis_ratio: f32,
    pub max_off_axis_ratio: f32,
    pub sample_count: u32,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            min_duration: 0.3,
            min_distance: 0.05,
            min_on_axis_ratio: 0.35,
            max_off_axis_ratio: 1.5,
            sample_count: 0,
        }
    }
}

impl ZoneThresholds {
    fn learn(&mut self, false_activation: bool) {
        let alpha = ((self.sample_count as f32) / 100.0).min(0.1);
        if false_activation {
            self.min_duration *= 1.0 + alpha * 0.1;
            self.min_distance *= 1.0 + alpha * 0.1;
            self.min_on_axis_ratio = (self.min_on_axis_ratio * (1.0 + alpha * 0.05)).min(0.5);
        } else {
            self.min_duration = (self.min_duration * (1.0 - alpha * 0.02)).max(0.2);
            self.min_distance = (self.min_distance * (1.0 - alpha * 0.02)).max(0.03);
            self.min_on_axis_ratio = (self.min_on_axis_ratio * (1.0 - alpha * 0.02)).max(0.3);
        }
        self.sample_count += 1;
    }
}

/// Bounded session history plus the learned threshold map.
#[derive(Debug, Default)]
pub struct SessionRecorder {
    history: VecDeque<SessionRecord>,
    thresholds: IndexMap<String, ZoneThresholds>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completes a record: stamps the end, learns, and archives it.
    pub fn finish(&mut self, mut record: SessionRecord, end_time: f64, cancelled: bool) {
        record.end_time = Some(end_time);
        record.was_cancelled = cancelled;

        let thresholds = self
            .thresholds
            .entry(record.zone.token().to_owned())
            .or_default();
        let false_activation = record.is_false_activation();
        thresholds.learn(false_activation);
        if false_activation {
            log::debug!(
                "false activation in {}: {:.0} ms, {:.3} units",
                record.zone.token(),
                record.duration() * 1000.0,
                record.total_distance
            );
        }

        if self.history.len() == SESSION_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    pub fn thresholds_for(&self, zone: Zone) -> ZoneThresholds {
        self.thresholds
            .get(zone.token())
            .copied()
            .unwrap_or_default()
    }

    pub fn history(&self) -> impl Iterator<Item = &SessionRecord> {
        self.history.iter()
    }

    /// Loads the persisted threshold map; malformed data degrades to empty.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut recorder = Self::new();
        if let Some(text) = store.get_text(THRESHOLDS_KEY) {
            match serde_json::from_str::<IndexMap<String, ZoneThresholds>>(&text) {
                Ok(thresholds) => recorder.thresholds = thresholds,
                Err(err) => log::warn!("discarding unreadable zone thresholds: {err}"),
            }
        }
        recorder
    }

    pub fn save(&self, store: &mut dyn SettingsStore) {
        match serde_json::to_string(&self.thresholds) {
            Ok(text) => store.set_text(THRESHOLDS_KEY, &text),
            Err(err) => log::warn!("cannot serialize zone thresholds: {err}"),
        }
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

    fn quick_record(zone: Zone, distance: f32) -> SessionRecord {
        let mut record = SessionRecord::new(zone, 0.0, ActivationSnapshot::default());
        record.note_delta((0.0, -distance), 1.0);
        record
    }

    #[test]
    fn test_false_activation_definition() {
        let mut record = quick_record(Zone::RightEdge, 0.01);
        record.end_time = Some(0.1);
        assert!(record.is_false_activation());

        // Long enough: not false.
        let mut record = quick_record(Zone::RightEdge, 0.01);
        record.end_time = Some(0.5);
        assert!(!record.is_false_activation());

        // Far enough: not false.
        let mut record = quick_record(Zone::RightEdge, 0.2);
        record.end_time = Some(0.1);
        assert!(!record.is_false_activation());

        // Cancelled sessions never count.
        let mut record = quick_record(Zone::RightEdge, 0.01);
        record.end_time = Some(0.1);
        record.was_cancelled = true;
        assert!(!record.is_false_activation());
    }

    #[test]
    fn test_direction_changes_need_negative_dot() {
        let mut record = SessionRecord::new(Zone::RightEdge, 0.0, ActivationSnapshot::default());
        record.note_delta((0.0, -0.02), 1.0);
        record.note_delta((0.0, -0.02), 1.2);
        assert_eq!(record.direction_changes, 0);
        record.note_delta((0.0, 0.02), 0.8);
        assert_eq!(record.direction_changes, 1);
        assert_eq!(record.max_velocity, 1.2);
    }

    #[test]
    fn test_false_activations_tighten_thresholds() {
        let mut recorder = SessionRecorder::new();
        let before = recorder.thresholds_for(Zone::BottomEdge);
        for _ in 0..50 {
            let mut record = quick_record(Zone::BottomEdge, 0.005);
            record.start_time = 0.0;
            recorder.finish(record, 0.05, false);
        }
        let after = recorder.thresholds_for(Zone::BottomEdge);
        assert!(after.min_duration > before.min_duration);
        assert!(after.min_distance > before.min_distance);
        assert!(after.min_on_axis_ratio <= 0.5);
    }

    #[test]
    fn test_good_sessions_relax_with_floors() {
        let mut recorder = SessionRecorder::new();
        for _ in 0..500 {
            let record = quick_record(Zone::RightEdge, 0.3);
            recorder.finish(record, 1.0, false);
        }
        let t = recorder.thresholds_for(Zone::RightEdge);
        assert!(t.min_duration >= 0.2);
        assert!(t.min_distance >= 0.03);
        assert!(t.min_on_axis_ratio >= 0.3);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut recorder = SessionRecorder::new();
        for _ in 0..SESSION_HISTORY_LEN + 10 {
            recorder.finish(quick_record(Zone::RightEdge, 0.1), 1.0, false);
        }
        assert_eq!(recorder.history().count(), SESSION_HISTORY_LEN);
    }

    #[test]
    fn test_threshold_round_trip() {
        let mut recorder = SessionRecorder::new();
        for _ in 0..20 {
            recorder.finish(quick_record(Zone::BottomEdge, 0.005), 0.05, false);
        }
        let mut store = MapStore::default();
        recorder.save(&mut store);

        let reloaded = SessionRecorder::load(&store);
        assert_eq!(
            reloaded.thresholds_for(Zone::BottomEdge),
            recorder.thresholds_for(Zone::BottomEdge)
        );
    }

    #[test]
    fn test_garbage_thresholds_degrade_to_defaults() {
        let mut store = MapStore::default();
        store.set_text(THRESHOLDS_KEY, "]]not json[[");
        let recorder = SessionRecorder::load(&store);
        assert_eq!(
            recorder.thresholds_for(Zone::RightEdge),
            ZoneThresholds::default()
        );
    }
}
