use std::sync::Arc;
use std::time::Duration;

use flipper_scenario_harness::{ScenarioHarness, Stick};
use flipper_ui::mock_filesystem::MockFileSystem;
use flipper_ui::test_panel::TestPanel;
use flipper_ui::RenderConfig;

#[test]
fn synchronous_path_flushes_every_request() {
    let mut harness = ScenarioHarness::new();
    harness.boot();
    assert!(!harness.shell().render_queue().is_queued());

    for _ in 0..4 {
        harness.press(Stick::Down);
    }
    assert_eq!(harness.primary_flushes(), 5);
    assert!(harness.with_primary(|panel| panel.flushed_pixels() == panel.pixels()));
}

#[test]
fn queued_path_coalesces_a_burst_into_one_flush() {
    let config = RenderConfig {
        settle: Some(Duration::from_millis(30)),
        ..RenderConfig::default()
    };
    let panel = TestPanel::oled().with_flush_delay(Duration::from_millis(20));
    let mut harness = ScenarioHarness::with_panel(panel, config, MockFileSystem::sample());
    harness.boot();
    assert!(harness.shell().render_queue().is_queued());
    assert!(harness.wait_for_render(Duration::from_secs(5)));
    assert_eq!(harness.primary_flushes(), 1);

    // Another drawer owns the panel for the whole burst, so the worker can
    // only flush once it lets go.
    let render = Arc::clone(harness.shell().render_queue());
    let drawing = render.lock().acquire();
    for _ in 0..6 {
        harness.press(Stick::Down);
    }
    assert!(render.is_render_pending() || render.is_render_busy());
    drop(drawing);

    assert!(harness.wait_for_render(Duration::from_secs(5)));
    assert_eq!(harness.primary_flushes(), 2);
    assert_eq!(harness.shell().menu().selected(), 1);
    assert!(harness.with_primary(|panel| panel.flushed_pixels() == panel.pixels()));
}
