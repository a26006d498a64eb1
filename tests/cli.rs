use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn shadowbloom() -> Command {
    Command::cargo_bin("shadowbloom").expect("binary exists")
}

#[test]
fn summary_prints_scene_lights_and_plan() {
    shadowbloom()
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("Loaded scene with 4 objects (4 lights)"))
        .stdout(contains(" - model (model, texture wood)"))
        .stdout(contains(" - cube (cube, texture wood)"))
        .stdout(contains(" - sphere (sphere, texture wood)"))
        .stdout(contains(" 2. point"))
        .stdout(contains(" 4. spot"))
        .stdout(contains("shadow[0] -> shadow-map-0 [clear]"))
        .stdout(contains("scene <- shadow-map-0, shadow-map-1, shadow-map-2, shadow-map-3 -> back-buffer [clear]"))
        .stdout(contains("11. overlay -> back-buffer\n"));
}

#[test]
fn flags_reroute_the_frame_plan() {
    shadowbloom()
        .args(["--summary-only", "--no-shadows", "--bloom"])
        .assert()
        .success()
        .stdout(contains("Bloom on, shadows off"))
        .stdout(contains("scene -> scene [clear]"))
        .stdout(contains("final <- bloom-composite -> back-buffer [clear]"))
        .stdout(contains("overlay -> back-buffer"))
        .stdout(contains("shadow[").not());
}

#[test]
fn settings_file_is_accepted() {
    let mut settings = NamedTempFile::new().expect("temp settings");
    write!(
        settings,
        r#"{{ "width": 800, "height": 600, "shadow_map_size": 512 }}"#
    )
    .expect("write settings");

    shadowbloom()
        .arg("--settings")
        .arg(settings.path())
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains("Loaded scene with 4 objects"));
}

#[test]
fn invalid_settings_fail() {
    let mut settings = NamedTempFile::new().expect("temp settings");
    write!(settings, r#"{{ "width": 0 }}"#).expect("write settings");

    shadowbloom()
        .arg("--settings")
        .arg(settings.path())
        .arg("--summary-only")
        .assert()
        .failure()
        .stderr(contains("window size must be non-zero"));
}

#[test]
fn unknown_argument_fails_with_usage() {
    shadowbloom()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(contains("Unknown argument: --bogus"))
        .stderr(contains("Usage: shadowbloom"));
}

#[test]
fn help_prints_usage() {
    shadowbloom()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Usage: shadowbloom"));
}
