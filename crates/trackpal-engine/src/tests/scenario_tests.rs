//! End-to-end scenarios driven through the scripted harness: full strokes in,
//! synthesized event stream out.

use trackpal_core::config::{Corner, CornerAction, EngineConfig};
use trackpal_core::contact::{ContactFrame, ContactState};
use trackpal_core::events::{
    MomentumPhase, NativeEvent, ScrollEventPhase, SyntheticEvent, TapVerdict,
    TRACKPAL_EVENT_TAG,
};
use trackpal_testing::{EngineHarness, TouchStroke};

fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn corner_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.corner_trigger_enabled = true;
    config.corner_trigger_zone_size = 0.10;
    config
        .corner_actions
        .insert(Corner::BottomRight, CornerAction::AppWindows);
    config
}

#[test]
fn test_pure_vertical_scroll_from_right_edge() {
    init_test_logging();
    let mut harness = EngineHarness::new();
    harness.play(&TouchStroke::new((0.95, 0.5), (0.95, 0.35), 5));

    let scrolls = harness.sink.scroll_events();
    assert!(
        scrolls
            .iter()
            .any(|e| e.phase == ScrollEventPhase::Began && e.is_zero_delta()),
        "missing the began marker"
    );
    assert!(scrolls
        .iter()
        .any(|e| e.phase == ScrollEventPhase::Ended && e.is_zero_delta()));

    // Natural-scroll inversion: downward finger, positive wheel Y, no X.
    let pixels: Vec<_> = scrolls.iter().filter(|e| !e.is_zero_delta()).collect();
    assert!(!pixels.is_empty());
    assert!(pixels.iter().all(|e| e.pixel_dy > 0 && e.pixel_dx == 0));
    assert!(scrolls.iter().all(|e| e.user_tag == TRACKPAL_EVENT_TAG));

    // Lift-off velocity is well above the coast threshold.
    assert!(harness.clock.is_running(), "inertia should have started");
    harness.sink.clear();
    harness.run_inertia(1000);

    let momentum: Vec<_> = harness.sink.scroll_events();
    assert_eq!(momentum.first().unwrap().momentum, MomentumPhase::Began);
    assert_eq!(momentum.last().unwrap().momentum, MomentumPhase::Ended);
    let coasting: Vec<_> = momentum
        .iter()
        .filter(|e| e.momentum != MomentumPhase::Ended)
        .collect();
    assert!(coasting.iter().all(|e| e.pixel_dy > 0 && e.pixel_dx == 0));
    for pair in coasting.windows(2) {
        assert!(pair[1].pixel_dy <= pair[0].pixel_dy, "coast must decay");
    }
    assert!(!harness.clock.is_running(), "clock must stop at rest");
}

#[test]
fn test_horizontal_bottom_edge_scroll() {
    let mut harness = EngineHarness::new();
    harness.play(&TouchStroke::new((0.50, 0.05), (0.70, 0.05), 6));

    let pixels: Vec<_> = harness
        .sink
        .scroll_events()
        .into_iter()
        .filter(|e| !e.is_zero_delta())
        .collect();
    assert!(!pixels.is_empty());
    // No inversion on X, and the aspect compensation applies: a full-speed
    // frame is 0.0333 × 3 × 100 × 1.6 = 16 px.
    assert!(pixels.iter().all(|e| e.pixel_dx > 0 && e.pixel_dy == 0));
    assert!(pixels.iter().any(|e| e.pixel_dx >= 14));
    let (dx, _) = harness.sink.total_pixels();
    assert!(dx > 50, "expected a substantial horizontal scroll, got {dx}");
}

#[test]
fn test_bottom_edge_false_activation_rejects_to_cursor() {
    let mut harness = EngineHarness::new();
    let filter = harness.engine.interceptor();
    let stroke = TouchStroke::new((0.50, 0.05), (0.51, 0.18), 4);
    let frames = stroke.frames();

    // Touch-down in the band: the engine takes ownership of the touch and
    // the interceptor starts suppressing cursor motion.
    harness.send_frame(frames[0]);
    assert_eq!(filter.decide(&NativeEvent::MouseMoved), TapVerdict::Drop);

    for frame in &frames[1..] {
        harness.send_frame(*frame);
    }

    // The mostly-vertical drag was rejected: no scroll output, and the
    // interceptor stops suppressing so the cursor moves again.
    assert!(harness.sink.scroll_events().is_empty());
    assert_eq!(filter.decide(&NativeEvent::MouseMoved), TapVerdict::Pass);
    assert_eq!(
        filter.decide(&NativeEvent::Scroll { user_tag: None }),
        TapVerdict::Pass
    );
}

#[test]
fn test_palm_contact_is_filtered() {
    let mut harness = EngineHarness::new();
    let palm = ContactFrame {
        x: 0.5,
        y: 0.5,
        state: ContactState::Start,
        density: 0.30,
        major_axis: 22.0,
        minor_axis: 18.0,
        timestamp: 0.0,
    };
    harness.send_frame(palm);

    assert_eq!(harness.engine.filter_counters().too_large, 1);
    assert!(harness.sink.events().is_empty());
    // No session was created: a stray release does nothing either.
    harness.send_frame(ContactFrame {
        state: ContactState::Released,
        density: 0.0,
        timestamp: 0.1,
        ..palm
    });
    assert!(harness.sink.events().is_empty());
}

#[test]
fn test_multi_to_single_debounce() {
    let mut harness = EngineHarness::new();
    // Two-finger gesture for 300 ms.
    for i in 0..18 {
        harness.send_batch(&[], i as f64 / 60.0, 2);
    }

    // A single-finger stroke entirely inside the 150 ms debounce window is
    // discarded wholesale.
    harness.play(&TouchStroke::new((0.95, 0.5), (0.95, 0.42), 3).starting_at(0.31));
    assert!(harness.sink.scroll_events().is_empty());

    // The same stroke after the window scrolls normally.
    harness.play(&TouchStroke::new((0.95, 0.5), (0.95, 0.35), 5).starting_at(0.50));
    assert!(!harness.sink.scroll_events().is_empty());
}

#[test]
fn test_corner_tap_fires_configured_action() {
    let mut harness = EngineHarness::with_config(corner_config());

    // Held ~100 ms with jitter: ~0.01 of path, but no net displacement.
    let jitter = [
        (0.9688, 0.0312),
        (0.9700, 0.0300),
        (0.9712, 0.0288),
        (0.9700, 0.0300),
        (0.9688, 0.0312),
        (0.9700, 0.0300),
    ];
    let mut t = 0.0;
    harness.send_frame(ContactFrame {
        x: 0.97,
        y: 0.03,
        state: ContactState::Start,
        density: 0.10,
        major_axis: 8.0,
        minor_axis: 7.0,
        timestamp: t,
    });
    for (x, y) in jitter {
        t += 1.0 / 60.0;
        harness.send_frame(ContactFrame {
            x,
            y,
            state: ContactState::Move,
            density: 0.10,
            major_axis: 8.0,
            minor_axis: 7.0,
            timestamp: t,
        });
    }
    harness.send_frame(ContactFrame {
        x: 0.97,
        y: 0.03,
        state: ContactState::Released,
        density: 0.0,
        major_axis: 0.0,
        minor_axis: 0.0,
        timestamp: t + 1.0 / 60.0,
    });

    assert_eq!(
        harness.sink.events(),
        vec![SyntheticEvent::CornerAction(CornerAction::AppWindows)]
    );
}

#[test]
fn test_corner_slide_promotes_and_scrolls_instead_of_tapping() {
    let mut harness = EngineHarness::with_config(corner_config());
    harness.play(&TouchStroke::new((0.97, 0.03), (0.80, 0.03), 4));

    let events = harness.sink.events();
    // The slide became a horizontal scroll (leftward: negative X)...
    let pixels: Vec<_> = harness
        .sink
        .scroll_events()
        .into_iter()
        .filter(|e| !e.is_zero_delta())
        .collect();
    assert!(!pixels.is_empty());
    assert!(pixels.iter().all(|e| e.pixel_dx < 0 && e.pixel_dy == 0));
    // ...and no corner action fired at lift-off.
    assert!(!events
        .iter()
        .any(|e| matches!(e, SyntheticEvent::CornerAction(_))));
}

#[test]
fn test_middle_click_tap() {
    let mut config = EngineConfig::default();
    config.middle_click_enabled = true;
    let mut harness = EngineHarness::with_config(config.clone());

    // A still tap in the middle-click strip (opposite the bottom band).
    harness.play(&TouchStroke::tap((0.5, 0.95), 4));
    assert_eq!(harness.sink.events(), vec![SyntheticEvent::MiddleClick]);

    // A drag through the same strip is not a click.
    let mut harness = EngineHarness::with_config(config);
    harness.play(&TouchStroke::new((0.5, 0.95), (0.45, 0.95), 4).starting_at(1.0));
    assert!(harness.sink.events().is_empty());
}
