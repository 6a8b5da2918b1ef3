use std::time::Duration;

use flipper_scenario_harness::{ScenarioHarness, Stick};

#[test]
fn boot_renders_both_panels() {
    let mut harness = ScenarioHarness::dual();
    harness.boot();

    assert_eq!(harness.primary_flushes(), 1);
    assert_eq!(harness.secondary_flushes(), 1);
    let lit = harness
        .shell()
        .secondary()
        .map_or(0, |panel| panel.lit_pixel_count());
    assert!(lit > 0);
}

#[test]
fn secondary_waits_for_quiet_input() {
    let mut harness = ScenarioHarness::dual();
    harness.boot();

    harness.press(Stick::Down);
    assert_eq!(harness.primary_flushes(), 2);
    assert_eq!(harness.secondary_flushes(), 1);

    // Each press restarts the quiet window.
    harness.advance(Duration::from_millis(300));
    harness.press(Stick::Down);
    harness.advance(Duration::from_millis(300));
    assert_eq!(harness.secondary_flushes(), 1);

    harness.advance(Duration::from_millis(250));
    assert_eq!(harness.secondary_flushes(), 2);
    assert!(!harness.shell().debounce().needs_update());

    // Nothing new to show.
    harness.advance(Duration::from_secs(2));
    assert_eq!(harness.secondary_flushes(), 2);
    assert_eq!(harness.primary_flushes(), 3);
}

#[test]
fn window_is_measured_from_the_last_input() {
    let mut harness = ScenarioHarness::dual();
    harness.boot();

    // Input lands on the first tick of the press.
    harness.press(Stick::Down);
    harness.advance(Duration::from_millis(480));
    assert_eq!(harness.secondary_flushes(), 1);
    harness.tick();
    assert_eq!(harness.secondary_flushes(), 2);
}

#[test]
fn secondary_is_frozen_while_an_app_runs() {
    let mut harness = ScenarioHarness::dual();
    harness.boot();

    harness.press(Stick::Up);
    harness.click();
    assert!(harness.shell().is_app_running());

    harness.advance(Duration::from_secs(1));
    assert_eq!(harness.secondary_flushes(), 1);
    assert!(harness.shell().debounce().needs_update());

    harness.press(Stick::Left);
    assert!(!harness.shell().is_app_running());
    harness.advance(Duration::from_millis(400));
    assert_eq!(harness.secondary_flushes(), 1);
    harness.advance(Duration::from_millis(200));
    assert_eq!(harness.secondary_flushes(), 2);
}
