use std::path::Path;

use dbw_controls::{Bounds, Controller, NullSink};

#[test]
fn bundled_loops_load_and_validate() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("loops/steering.yaml");
    let file = dbw_project::load_yaml(&path)
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));

    assert_eq!(file.loops.len(), 3);
    let ids: Vec<&str> = file.loops.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["steering", "heading", "throttle"]);

    let throttle = dbw_project::loop_config(&file, "throttle").unwrap();
    assert!(!throttle.enabled);
    assert_eq!(throttle.max_integral_cumulation, 30_000);
}

#[test]
fn heading_loop_drives_controller() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("loops/steering.yaml");
    let file = dbw_project::load_yaml(&path).unwrap();
    let config = dbw_project::loop_config(&file, "heading").unwrap();

    let mut pid = Controller::from_config(config, || 80, NullSink).unwrap();
    assert_eq!(pid.input_bounds(), Some(Bounds::new(0, 360).unwrap()));

    // error 10, derivative 10: 0.8 * 10 + 0.5 * 10
    assert_eq!(pid.tick(), Some(13));
}
