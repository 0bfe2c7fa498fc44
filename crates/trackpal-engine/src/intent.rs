//! Activation intent evaluation.
//!
//! For the first few frames of a scroll-zone or corner touch the engine does
//! not know whether the user wants to scroll, tap, or just move the cursor.
//! This module accumulates per-frame evidence into a confidence scalar and
//! decides between `Activated`, `Rejected`, and `NeedMoreFrames`.
//!
//! The confidence starts at a zone prior (deeper starts are more likely to be
//! deliberate), each delta contributes direction and speed evidence weighted
//! by contact quality, and the decision compares against a threshold the
//! adaptive learner may lower for users who keep retrying.

use trackpal_core::config::EngineConfig;
use trackpal_core::contact::ContactFrame;

use crate::constants::{
    ACTIVATION_MAX_FRAMES, ASPECT_COMPENSATION, BASE_ACTIVATION_THRESHOLD,
    CORNER_HORIZONTAL_BIAS, CORNER_PROMOTION_MOVEMENT, DIRECTION_DEAD_ZONE,
    EVIDENCE_MOVEMENT_EPSILON, HORIZONTAL_MIN_ON_AXIS_RATIO, MAX_FRAME_PENALTY,
    MIN_ACTIVATION_THRESHOLD, OFF_AXIS_PENALTY_GAIN, OFF_AXIS_VETO_FRAME_LIMIT,
    OFF_AXIS_VETO_RATIO, ON_AXIS_GAIN, QUALITY_DENSITY_FLOOR, QUALITY_DENSITY_RANGE,
    QUALITY_WEIGHT_FLOOR, REJECTION_CONFIDENCE, STATIONARY_ACTIVATION_CONFIDENCE,
    VELOCITY_BOOST_STEPS, ZONE_PRIOR_BASE, ZONE_PRIOR_DEPTH_GAIN,
};
use crate::learner::AdaptiveLearner;
use crate::session::TouchSession;
use crate::zone::{adjacent_edges, edge_enabled, zone_depth, Axis, Zone};

/// Evaluator output for one pending frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentDecision {
    Activated,
    Rejected,
    NeedMoreFrames,
}

/// Initial confidence for a touch starting at `position` inside `zone`.
pub fn zone_prior(zone: Zone, position: (f32, f32), config: &EngineConfig) -> f32 {
    ZONE_PRIOR_BASE + ZONE_PRIOR_DEPTH_GAIN * zone_depth(zone, position.0, position.1, config)
}

/// Puts a fresh scroll-zone or corner session into activation-pending.
pub fn begin_activation(session: &mut TouchSession, config: &EngineConfig) {
    session.activation.pending = true;
    session.activation.confidence = zone_prior(session.zone, session.start_position, config);
    session
        .activation
        .frames
        .push(session.start_position);
}

/// The on-axis movement ratio of one delta for the given axis, with
/// horizontal aspect compensation applied. `None` for negligible movement.
pub fn on_axis_ratio(delta: (f32, f32), axis: Axis) -> Option<f32> {
    let abs_dx = delta.0.abs() * ASPECT_COMPENSATION;
    let abs_dy = delta.1.abs();
    let total = abs_dx + abs_dy;
    if total < EVIDENCE_MOVEMENT_EPSILON {
        return None;
    }
    Some(match axis {
        Axis::Horizontal => abs_dx / total,
        Axis::Vertical => abs_dy / total,
    })
}

/// Processes one pending move frame: buffers its evidence, handles corner
/// promotion, updates confidence, and returns the decision.
///
/// The caller has already updated the session's velocity history for this
/// frame; `last_position` must still refer to the previous frame.
pub fn process_pending_frame(
    session: &mut TouchSession,
    frame: &ContactFrame,
    learner: &AdaptiveLearner,
    config: &EngineConfig,
) -> IntentDecision {
    let delta = (
        frame.x - session.last_position.0,
        frame.y - session.last_position.1,
    );
    session.activation.frames.push((frame.x, frame.y));
    session.activation.deltas.push(delta);
    session.activation.densities.push(frame.density);

    if session.zone.is_corner() {
        match try_promote_corner(session, config) {
            CornerOutcome::Promoted => {
                // Fall through and evaluate the buffered evidence under the
                // promoted zone's axis.
                return replay_buffered_evidence(session, learner);
            }
            CornerOutcome::NoAdjacentEdge => return IntentDecision::Rejected,
            CornerOutcome::StillTap => {
                // A corner touch that has not moved yet stays pending until
                // the frame budget runs out; the tap fires at lift-off.
                return if session.activation.evidence_frames() >= ACTIVATION_MAX_FRAMES {
                    IntentDecision::Rejected
                } else {
                    IntentDecision::NeedMoreFrames
                };
            }
        }
    }

    // The very first delta is noise: initial contact frames wobble at sensor
    // edges. Buffer it but feed no evidence.
    if session.activation.deltas.len() < 2 {
        return IntentDecision::NeedMoreFrames;
    }

    apply_evidence(session, delta, frame.density, learner)
}

/// One Bayesian-style evidence update plus the decision.
fn apply_evidence(
    session: &mut TouchSession,
    delta: (f32, f32),
    density: f32,
    learner: &AdaptiveLearner,
) -> IntentDecision {
    let Some(axis) = session.zone.axis() else {
        return IntentDecision::NeedMoreFrames;
    };
    let frames_in = session.activation.evidence_frames();

    let Some(ratio) = on_axis_ratio(delta, axis) else {
        // Negligible movement carries no evidence, but a touch that has
        // already convinced us gets activated rather than starved.
        return if session.activation.confidence >= STATIONARY_ACTIVATION_CONFIDENCE {
            IntentDecision::Activated
        } else {
            decide(session, learner, axis, frames_in)
        };
    };

    let (on_axis_speed, off_axis_speed) = axis_speeds(session, axis);

    // Hard rejections for horizontal zones, checked before any positive
    // evidence: a mostly-vertical drag through the bottom band is cursor
    // motion, not a scroll.
    if axis == Axis::Horizontal {
        if frames_in <= OFF_AXIS_VETO_FRAME_LIMIT
            && off_axis_speed > OFF_AXIS_VETO_RATIO * on_axis_speed
        {
            return IntentDecision::Rejected;
        }
        if frames_in >= 2 && ratio < HORIZONTAL_MIN_ON_AXIS_RATIO {
            return IntentDecision::Rejected;
        }
    }

    let center = learner.direction_center(axis);
    let deviation = ratio - center;
    let direction_boost = if deviation.abs() <= DIRECTION_DEAD_ZONE {
        0.0
    } else if deviation > 0.0 {
        (deviation - DIRECTION_DEAD_ZONE) / (1.0 - center - DIRECTION_DEAD_ZONE) * ON_AXIS_GAIN
    } else {
        (deviation + DIRECTION_DEAD_ZONE) / (center - DIRECTION_DEAD_ZONE) * OFF_AXIS_PENALTY_GAIN
    };

    let velocity_boost = VELOCITY_BOOST_STEPS
        .iter()
        .find(|(threshold, _)| on_axis_speed > *threshold)
        .map(|(_, boost)| *boost)
        .unwrap_or(0.0);

    let quality_weight = ((density - QUALITY_DENSITY_FLOOR) / QUALITY_DENSITY_RANGE)
        .clamp(0.0, 1.0)
        * (1.0 - QUALITY_WEIGHT_FLOOR)
        + QUALITY_WEIGHT_FLOOR;

    let update = ((direction_boost + velocity_boost) * quality_weight).max(MAX_FRAME_PENALTY);
    session.activation.confidence = (session.activation.confidence + update).clamp(0.0, 1.0);

    decide(session, learner, axis, frames_in)
}

fn decide(
    session: &TouchSession,
    learner: &AdaptiveLearner,
    axis: Axis,
    frames_in: usize,
) -> IntentDecision {
    let threshold =
        (BASE_ACTIVATION_THRESHOLD - learner.retry_bonus(axis)).max(MIN_ACTIVATION_THRESHOLD);
    if session.activation.confidence >= threshold {
        IntentDecision::Activated
    } else if session.activation.confidence <= REJECTION_CONFIDENCE {
        IntentDecision::Rejected
    } else if frames_in >= ACTIVATION_MAX_FRAMES {
        IntentDecision::Rejected
    } else {
        IntentDecision::NeedMoreFrames
    }
}

/// On- and off-axis speeds from the latest velocity sample.
fn axis_speeds(session: &TouchSession, axis: Axis) -> (f32, f32) {
    let Some(sample) = session.velocity_history.latest() else {
        return (0.0, 0.0);
    };
    match axis {
        Axis::Horizontal => (sample.vx.abs(), sample.vy.abs()),
        Axis::Vertical => (sample.vy.abs(), sample.vx.abs()),
    }
}

enum CornerOutcome {
    Promoted,
    StillTap,
    NoAdjacentEdge,
}

/// Promotes a sliding corner touch to one of its adjacent scroll edges.
///
/// The trigger is net displacement (the vector sum of the buffered deltas),
/// not path length: a held fingertip jitters a visible path without going
/// anywhere, and must stay a tap.
fn try_promote_corner(session: &mut TouchSession, config: &EngineConfig) -> CornerOutcome {
    let (net_dx, net_dy) = session
        .activation
        .deltas
        .iter()
        .fold((0.0f32, 0.0f32), |(ax, ay), (dx, dy)| (ax + dx, ay + dy));
    let net_movement = (net_dx * net_dx + net_dy * net_dy).sqrt();
    if net_movement <= CORNER_PROMOTION_MOVEMENT {
        return CornerOutcome::StillTap;
    }

    let Some(corner) = session.zone.corner() else {
        return CornerOutcome::StillTap;
    };
    let (horizontal_edge, vertical_edge) = adjacent_edges(corner);
    let horizontal_ok = edge_enabled(horizontal_edge, config);
    let vertical_ok = edge_enabled(vertical_edge, config);

    let promoted = match (horizontal_ok, vertical_ok) {
        (true, true) => {
            // Edge sensor noise inflates Y near the rim, so the horizontal
            // component gets a bias when both edges are candidates.
            if net_dx.abs() * CORNER_HORIZONTAL_BIAS >= net_dy.abs() {
                horizontal_edge
            } else {
                vertical_edge
            }
        }
        (true, false) => horizontal_edge,
        (false, true) => vertical_edge,
        (false, false) => return CornerOutcome::NoAdjacentEdge,
    };

    session.zone = promoted;
    session.activation.confidence = zone_prior(promoted, session.start_position, config);
    CornerOutcome::Promoted
}

/// After a corner promotion, the buffered deltas are re-read as evidence for
/// the promoted zone so the slide's direction counts immediately.
fn replay_buffered_evidence(
    session: &mut TouchSession,
    learner: &AdaptiveLearner,
) -> IntentDecision {
    let deltas: Vec<(f32, f32)> = session.activation.deltas.iter().skip(1).copied().collect();
    let densities: Vec<f32> = session.activation.densities.iter().skip(1).copied().collect();
    let mut decision = IntentDecision::NeedMoreFrames;
    for (delta, density) in deltas.into_iter().zip(densities) {
        decision = apply_evidence(session, delta, density, learner);
        if decision != IntentDecision::NeedMoreFrames {
            break;
        }
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackpal_core::config::{Corner, CornerAction, VerticalEdgeMode};
    use trackpal_core::contact::ContactState;

    fn frame(x: f32, y: f32, t: f64) -> ContactFrame {
        ContactFrame {
            x,
            y,
            state: ContactState::Move,
            density: 0.10,
            major_axis: 8.0,
            minor_axis: 7.0,
            timestamp: t,
        }
    }

    /// Drives a pending session through a straight-line stroke at 60 Hz.
    fn run_stroke(
        mut session: TouchSession,
        to: (f32, f32),
        steps: usize,
        config: &EngineConfig,
        learner: &AdaptiveLearner,
    ) -> (TouchSession, IntentDecision, usize) {
        let from = session.start_position;
        let mut decision = IntentDecision::NeedMoreFrames;
        let mut frames_used = 0;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let f = frame(
                from.0 + (to.0 - from.0) * t,
                from.1 + (to.1 - from.1) * t,
                i as f64 / 60.0,
            );
            let dt = f.timestamp - session.last_time;
            session.velocity_history.push(
                (f.x - session.last_position.0) / dt as f32,
                (f.y - session.last_position.1) / dt as f32,
                f.timestamp,
            );
            decision = process_pending_frame(&mut session, &f, learner, config);
            session.last_position = (f.x, f.y);
            session.last_time = f.timestamp;
            frames_used = i;
            if decision != IntentDecision::NeedMoreFrames {
                break;
            }
        }
        (session, decision, frames_used)
    }

    fn pending_session(zone: Zone, start: (f32, f32), config: &EngineConfig) -> TouchSession {
        let mut session = TouchSession::new(zone, start, 0.0);
        begin_activation(&mut session, config);
        session
    }

    #[test]
    fn test_zone_prior_range() {
        let config = EngineConfig::default();
        let shallow = zone_prior(Zone::RightEdge, (0.86, 0.5), &config);
        let deep = zone_prior(Zone::RightEdge, (0.995, 0.5), &config);
        assert!(shallow >= ZONE_PRIOR_BASE);
        assert!(deep <= ZONE_PRIOR_BASE + ZONE_PRIOR_DEPTH_GAIN);
        assert!(deep > shallow);
    }

    #[test]
    fn test_clean_vertical_swipe_activates_early() {
        let config = EngineConfig::default();
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::RightEdge, (0.95, 0.5), &config);
        let (_, decision, frames_used) =
            run_stroke(session, (0.95, 0.35), 5, &config, &learner);
        assert_eq!(decision, IntentDecision::Activated);
        assert!(frames_used <= 4, "activated on frame {frames_used}");
    }

    #[test]
    fn test_horizontal_swipe_activates() {
        let config = EngineConfig::default();
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::BottomEdge, (0.50, 0.05), &config);
        let (_, decision, _) = run_stroke(session, (0.70, 0.05), 6, &config, &learner);
        assert_eq!(decision, IntentDecision::Activated);
    }

    #[test]
    fn test_vertical_drag_through_bottom_band_rejects() {
        let config = EngineConfig::default();
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::BottomEdge, (0.50, 0.05), &config);
        let (_, decision, frames_used) =
            run_stroke(session, (0.51, 0.18), 4, &config, &learner);
        assert_eq!(decision, IntentDecision::Rejected);
        assert!(frames_used <= 3, "rejected on frame {frames_used}");
    }

    #[test]
    fn test_first_delta_carries_no_evidence() {
        let config = EngineConfig::default();
        let learner = AdaptiveLearner::new();
        let mut session = pending_session(Zone::RightEdge, (0.95, 0.5), &config);
        let prior = session.activation.confidence;
        session.velocity_history.push(0.0, -1.8, 1.0 / 60.0);
        let decision =
            process_pending_frame(&mut session, &frame(0.95, 0.47, 1.0 / 60.0), &learner, &config);
        assert_eq!(decision, IntentDecision::NeedMoreFrames);
        assert_eq!(session.activation.confidence, prior);
    }

    #[test]
    fn test_stationary_touch_times_out() {
        let config = EngineConfig::default();
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::RightEdge, (0.88, 0.5), &config);
        // Micro-jitter well below the evidence epsilon.
        let (_, decision, _) = run_stroke(session, (0.880002, 0.5), 12, &config, &learner);
        assert_eq!(decision, IntentDecision::Rejected);
    }

    #[test]
    fn test_retry_bonus_lowers_threshold() {
        let config = EngineConfig::default();
        let mut learner = AdaptiveLearner::new();
        // A shallow, slow swipe that sits just under the base threshold.
        let session = pending_session(Zone::RightEdge, (0.87, 0.5), &config);
        let (_, base_decision, _) =
            run_stroke(session, (0.87, 0.47), ACTIVATION_MAX_FRAMES + 1, &config, &learner);

        // Earn the maximum retry bonus, then try the same swipe again.
        let mut t = 0.0;
        for _ in 0..20 {
            learner.on_activation_failure(Axis::Vertical, t);
            learner.on_session_start(Axis::Vertical, t + 0.5);
            t += 3.0;
        }
        let session = pending_session(Zone::RightEdge, (0.87, 0.5), &config);
        let (_, boosted_decision, _) =
            run_stroke(session, (0.87, 0.47), ACTIVATION_MAX_FRAMES + 1, &config, &learner);

        // The bonus can only make activation easier.
        if base_decision == IntentDecision::Activated {
            assert_eq!(boosted_decision, IntentDecision::Activated);
        }
        assert!(learner.retry_bonus(Axis::Vertical) > 0.0);
    }

    #[test]
    fn test_corner_slide_promotes_to_bottom_edge() {
        let mut config = EngineConfig::default();
        config.corner_trigger_enabled = true;
        config.corner_trigger_zone_size = 0.10;
        config
            .corner_actions
            .insert(Corner::BottomRight, CornerAction::AppWindows);
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::BottomRightCorner, (0.97, 0.03), &config);
        let (session, decision, _) = run_stroke(session, (0.80, 0.03), 4, &config, &learner);
        assert_eq!(session.zone, Zone::BottomEdge);
        assert_eq!(session.original_zone, Zone::BottomRightCorner);
        assert_eq!(decision, IntentDecision::Activated);
    }

    #[test]
    fn test_corner_slide_down_right_edge_promotes_vertically() {
        let mut config = EngineConfig::default();
        config.corner_trigger_enabled = true;
        config.corner_trigger_zone_size = 0.10;
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::TopRightCorner, (0.97, 0.97), &config);
        let (session, _, _) = run_stroke(session, (0.97, 0.80), 4, &config, &learner);
        assert_eq!(session.zone, Zone::RightEdge);
    }

    #[test]
    fn test_corner_tap_stays_pending_until_budget() {
        let mut config = EngineConfig::default();
        config.corner_trigger_enabled = true;
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::BottomRightCorner, (0.97, 0.03), &config);
        // Movement below the promotion threshold for the whole budget.
        let (session, decision, _) =
            run_stroke(session, (0.9701, 0.0301), ACTIVATION_MAX_FRAMES + 1, &config, &learner);
        assert_eq!(decision, IntentDecision::Rejected);
        assert_eq!(session.zone, Zone::BottomRightCorner);
    }

    #[test]
    fn test_corner_with_no_enabled_edges_rejects_on_slide() {
        let mut config = EngineConfig::default();
        config.corner_trigger_enabled = true;
        // Bottom-left corner with right-only vertical edges and a bottom
        // band... the bottom edge is enabled, so use the top-left corner,
        // whose horizontal edge (top) is disabled too.
        config.vertical_edge_mode = VerticalEdgeMode::Right;
        let learner = AdaptiveLearner::new();
        let session = pending_session(Zone::TopLeftCorner, (0.03, 0.97), &config);
        let (_, decision, _) = run_stroke(session, (0.20, 0.97), 4, &config, &learner);
        assert_eq!(decision, IntentDecision::Rejected);
    }

    #[test]
    fn test_off_axis_veto_fires_on_first_evidence_frame() {
        let config = EngineConfig::default();
        let learner = AdaptiveLearner::new();
        let mut session = pending_session(Zone::BottomEdge, (0.50, 0.05), &config);
        // First delta: discarded.
        session.velocity_history.push(0.06, 0.9, 1.0 / 60.0);
        process_pending_frame(&mut session, &frame(0.501, 0.065, 1.0 / 60.0), &learner, &config);
        session.last_position = (0.501, 0.065);
        session.last_time = 1.0 / 60.0;
        // Second delta: off-axis speed dwarfs on-axis speed.
        session.velocity_history.push(0.06, 0.9, 2.0 / 60.0);
        let decision =
            process_pending_frame(&mut session, &frame(0.502, 0.080, 2.0 / 60.0), &learner, &config);
        assert_eq!(decision, IntentDecision::Rejected);
    }
}
