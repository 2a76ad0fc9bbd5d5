//! Session-level isolation guarantees: switching, resetting, and resizing
//! must only touch the state each operation names.

use pde_sandbox_core::Sandbox;

#[test]
fn test_variant_switch_preserves_inactive_fields() {
    let mut sandbox = Sandbox::without_gpu(1000, 800);

    // Paint the heat grid, then seed Gray-Scott's catalyst
    sandbox.brush(340.0, 400.0);
    sandbox.select(1);
    sandbox.brush(340.0, 400.0);

    // Heat still holds its stroke, untouched by the Gray-Scott edit
    sandbox.select(0);
    assert_eq!(sandbox.active().store().layer(0).get(42, 50), 1.0);

    // And the catalyst stroke survived the round trip
    sandbox.select(1);
    assert_eq!(sandbox.active().store().layer(1).get(42, 50), 1.0);
}

#[test]
fn test_reset_settings_does_not_clear_any_grid() {
    let mut sandbox = Sandbox::without_gpu(1000, 800);
    sandbox.brush(340.0, 400.0);
    sandbox.select(2);
    sandbox.brush(340.0, 400.0);

    sandbox.reset_settings();

    // Active (wave) and inactive (heat) grids both keep their strokes
    assert_eq!(sandbox.active().store().layer(0).get(42, 50), 1.0);
    sandbox.select(0);
    assert_eq!(sandbox.active().store().layer(0).get(42, 50), 1.0);
}

#[test]
fn test_reset_grid_does_not_touch_settings_or_other_variants() {
    let mut sandbox = Sandbox::without_gpu(1000, 800);
    sandbox.brush(340.0, 400.0);
    sandbox.solver.time_step = 0.42;

    sandbox.reset_grid();

    assert!(sandbox
        .active()
        .store()
        .layer(0)
        .as_slice()
        .iter()
        .all(|&v| v == 0.0));
    // Solver settings survive a grid reset
    assert_eq!(sandbox.solver.time_step, 0.42);
}

#[test]
fn test_reset_settings_applies_active_variant_recommendation() {
    let mut sandbox = Sandbox::without_gpu(1000, 800);

    sandbox.select(2); // wave
    sandbox.reset_settings();
    assert_eq!(sandbox.solver.time_step, 0.05);

    sandbox.select(0); // heat
    sandbox.reset_settings();
    assert_eq!(sandbox.solver.space_step, 3.0);
    assert_eq!(sandbox.solver.time_step, 0.1);
}

#[test]
fn test_resize_applies_to_every_variant_at_once() {
    let mut sandbox = Sandbox::without_gpu(1000, 800);
    sandbox.resize(800, 640);

    for index in 0..4 {
        sandbox.select(index);
        let store = sandbox.active().store();
        assert_eq!(store.width(), 60, "variant {index}"); // (800 - 320) / 8
        assert_eq!(store.height(), 80, "variant {index}");
    }
}

#[test]
fn test_brush_coordinates_follow_active_grid() {
    let mut sandbox = Sandbox::without_gpu(1000, 800);

    // Same pointer position paints the same cell on every variant because
    // all grids share one geometry
    for index in 0..4 {
        sandbox.select(index);
        sandbox.brush(340.0, 400.0);
        let layer = sandbox.active().brush_layer();
        assert_eq!(
            sandbox.active().store().layer(layer).get(42, 50),
            1.0,
            "variant {index}"
        );
    }
}

#[test]
fn test_paused_session_still_composites() {
    let mut sandbox = Sandbox::without_gpu(1000, 800);
    sandbox.brush(340.0, 400.0);
    sandbox.release_brush();
    sandbox.paused = true;

    sandbox.advance_frame();

    let store = sandbox.active().store();
    assert_eq!(store.layer(0).get(42, 50), 1.0);
    assert!(store.composite().chunks(4).all(|px| px[3] == 1.0));
}
