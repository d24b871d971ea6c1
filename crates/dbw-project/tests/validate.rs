use dbw_controls::{Bounds, ControlError, ControllerConfig};
use dbw_project::schema::*;
use dbw_project::{ProjectError, ValidationError, from_yaml_str, loop_config, validate_loop_file};

fn loop_def(id: &str, controller: ControllerConfig) -> LoopDef {
    LoopDef {
        id: id.to_string(),
        name: id.to_string(),
        description: None,
        controller,
    }
}

fn file(loops: Vec<LoopDef>) -> LoopFile {
    LoopFile {
        version: 1,
        name: "Validation".to_string(),
        loops,
    }
}

#[test]
fn duplicate_loop_ids_rejected() {
    let f = file(vec![
        loop_def("a", ControllerConfig::default()),
        loop_def("a", ControllerConfig::default()),
    ]);
    assert!(matches!(
        validate_loop_file(&f),
        Err(ValidationError::DuplicateId { .. })
    ));
}

#[test]
fn empty_loop_id_rejected() {
    let f = file(vec![loop_def("  ", ControllerConfig::default())]);
    assert!(matches!(
        validate_loop_file(&f),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn unsupported_version_rejected() {
    let mut f = file(vec![]);
    f.version = 99;
    assert!(matches!(
        validate_loop_file(&f),
        Err(ValidationError::UnsupportedVersion { version: 99 })
    ));
    f.version = 0;
    assert!(validate_loop_file(&f).is_err());
}

#[test]
fn invalid_controller_reports_loop() {
    let bad = ControllerConfig {
        output_bounds: Some(Bounds {
            lower: 10,
            upper: -10,
        }),
        ..ControllerConfig::default()
    };
    let f = file(vec![loop_def("steering", bad)]);

    match validate_loop_file(&f) {
        Err(ValidationError::Controller { loop_id, source }) => {
            assert_eq!(loop_id, "steering");
            assert_eq!(
                source,
                ControlError::InvalidBounds {
                    what: "output",
                    lower: 10,
                    upper: -10
                }
            );
        }
        other => panic!("Expected controller error, got {other:?}"),
    }
}

#[test]
fn yaml_with_negative_gain_rejected() {
    let yaml = r#"
version: 1
name: Bad gains
loops:
  - id: x
    name: X
    controller:
      gains: { p: 1.0, i: -0.5, d: 0.0 }
"#;
    assert!(matches!(
        from_yaml_str(yaml),
        Err(ProjectError::Validation(ValidationError::Controller { .. }))
    ));
}

#[test]
fn malformed_yaml_is_a_yaml_error() {
    assert!(matches!(
        from_yaml_str("version: [1"),
        Err(ProjectError::Yaml(_))
    ));
}

#[test]
fn missing_loop_lookup() {
    let f = file(vec![loop_def("a", ControllerConfig::default())]);
    assert!(loop_config(&f, "a").is_ok());
    assert!(matches!(
        loop_config(&f, "b"),
        Err(ProjectError::LoopNotFound(id)) if id == "b"
    ));
}
