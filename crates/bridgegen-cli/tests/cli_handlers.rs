use bridgegen::{
    format_symbols, handle_check, handle_generate, handle_init_config, handle_symbols,
    CONFIG_FILE_NAME,
};
use bridgegen_test_fixtures::{FixtureType, TestFixtures};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn generate_writes_one_file_per_type() {
    let mut fixtures = TestFixtures::new();
    let input = fixtures.setup(FixtureType::Engine);
    let out = tempfile::tempdir().unwrap();

    let summary = handle_generate(&input, out.path(), None, false).unwrap();

    assert_eq!(summary.diagnostics, 0);
    assert_eq!(summary.members, 13);
    let mut names: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Camera_binding.rs", "GfxTexture_binding.rs"]);

    let camera = fs::read_to_string(out.path().join("Camera_binding.rs")).unwrap();
    assert!(camera.starts_with("// Generated by bridgegen. DO NOT EDIT."));
}

#[test]
fn generate_fails_on_diagnostics_unless_allowed() {
    let mut fixtures = TestFixtures::new();
    let input = fixtures.setup(FixtureType::MixedLegality);
    let out = tempfile::tempdir().unwrap();

    let err = handle_generate(&input, out.path(), None, false).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("BG0007"), "{}", message);
    assert!(message.contains("BG0008"), "{}", message);
    // Legal members are still written.
    assert!(out.path().join("Camera_binding.rs").is_file());

    let summary = handle_generate(&input, out.path(), None, true).unwrap();
    assert_eq!(summary.members, 2);
    assert_eq!(summary.diagnostics, 2);
}

#[test]
fn allowed_diagnostics_are_still_reported() {
    let mut fixtures = TestFixtures::new();
    let input = fixtures.setup(FixtureType::MixedLegality);
    let out = tempfile::tempdir().unwrap();

    let summary = handle_generate(&input, out.path(), None, true).unwrap();
    let report = summary.report.unwrap();
    assert!(report.starts_with("Found 2 diagnostic(s):"), "{}", report);
    assert!(report.contains("## BG0007"), "{}", report);
    assert!(report.contains("## BG0008"), "{}", report);
    assert!(report.contains("engine::Camera::Bind"), "{}", report);

    let clean = fixtures.setup(FixtureType::Engine);
    let summary = handle_generate(&clean, out.path(), None, true).unwrap();
    assert_eq!(summary.report, None);
}

#[test]
fn config_beside_input_is_picked_up() {
    let mut fixtures = TestFixtures::new();
    let input = fixtures.setup(FixtureType::Engine);
    let dir = fixtures.dir().unwrap();
    fs::write(dir.join(CONFIG_FILE_NAME), "emit_header = false\nabi = \"system\"\n").unwrap();
    let out = tempfile::tempdir().unwrap();

    handle_generate(&input, out.path(), None, false).unwrap();

    let camera = fs::read_to_string(out.path().join("Camera_binding.rs")).unwrap();
    assert!(camera.starts_with("#[doc(hidden)]"));
    assert!(camera.contains("unsafe extern \"system\" fn("));
}

#[test]
fn invalid_config_is_reported() {
    let mut fixtures = TestFixtures::new();
    let input = fixtures.setup(FixtureType::Engine);
    let config = fixtures.dir().unwrap().join("broken.toml");
    fs::write(&config, "receiver_name = \"self\"\n").unwrap();

    let err = handle_check(&input, Some(&config)).unwrap_err();
    assert!(format!("{:#}", err).contains("receiver_name"));
}

#[test]
fn check_reports_type_level_problems() {
    let mut fixtures = TestFixtures::new();
    let input = fixtures.setup(FixtureType::InvalidTypes);

    let err = handle_check(&input, None).unwrap_err();
    let message = format!("{:#}", err);
    for code in ["BG0001", "BG0002", "BG0003"] {
        assert!(message.contains(code), "{}", message);
    }

    let clean = fixtures.setup(FixtureType::Engine);
    assert_eq!(handle_check(&clean, None).unwrap().units.len(), 2);
}

#[test]
fn symbols_lists_every_declaration() {
    let mut fixtures = TestFixtures::new();
    let input = fixtures.setup(FixtureType::MixedLegality);

    let rows = handle_symbols(&input, None).unwrap();
    let entry_points: Vec<&str> = rows.iter().map(|r| r.entry_point.as_str()).collect();
    assert_eq!(
        entry_points,
        vec![
            "Camera_GetEnabled",
            "Camera_Bind",
            "Camera_Active",
            "Camera_SetEnabled"
        ]
    );

    let table = format_symbols(&rows, false).unwrap();
    assert!(table.contains("Camera_GetEnabled  engine::Camera::enabled (property getter)"));

    let json: serde_json::Value = serde_json::from_str(&format_symbols(&rows, true).unwrap()).unwrap();
    assert_eq!(json[3]["function"], "set_enabled");
    assert_eq!(json[3]["kind"], "property_setter");
}

#[test]
fn init_config_round_trips_and_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    let text = handle_init_config(Some(&path)).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
    assert!(handle_init_config(Some(&path)).is_err());
    assert!(text.contains("runtime_crate = \"::bridgegen_runtime\""));
}
