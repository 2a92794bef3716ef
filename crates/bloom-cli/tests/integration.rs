//! Integration tests for bloom CLI commands.
//!
//! These tests run the actual binary and verify end-to-end behavior.

use std::path::PathBuf;
use std::process::Command;

/// Get the path to the bloom binary from the workspace root.
fn binary_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // Go up from bloom-cli to crates
    path.pop(); // Go up from crates to the workspace root

    // Try release first, then debug
    let release = path.join("target/release/bloom");
    if release.exists() {
        return release;
    }
    path.join("target/debug/bloom")
}

#[test]
fn params_command_lists_all_parameters() {
    let output = Command::new(binary_path())
        .arg("params")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    for name in [
        "num_points",
        "delta_theta",
        "delta_height",
        "start_angle",
        "thickness",
        "thickness_growth",
        "neighbor_offsets",
    ] {
        assert!(stdout.contains(name), "Should list '{}'", name);
    }
}

#[test]
fn build_command_produces_json_with_expected_counts() {
    let output = Command::new(binary_path())
        .args(["build", "-f", "json"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    // Defaults: N=300, offsets (8,13) -> 279 cages
    assert_eq!(json["points"].as_array().unwrap().len(), 300);
    assert_eq!(json["cages"].as_array().unwrap().len(), 279);
    assert_eq!(json["config"]["num_points"], 300);
}

#[test]
fn build_command_respects_offsets() {
    let output = Command::new(binary_path())
        .args(["build", "-n", "50", "--offsets", "13,21"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");

    // 50 - (13+21) = 16 cages
    assert_eq!(json["cages"].as_array().unwrap().len(), 16);
}

#[test]
fn build_command_produces_svg() {
    let output = Command::new(binary_path())
        .args(["build", "-f", "svg", "-n", "40"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("<svg"), "Should have SVG element");
    assert!(stdout.contains("<line"), "Should have cage wireframe lines");
    assert!(stdout.contains("</svg>"), "Should close SVG element");
}

#[test]
fn build_command_rejects_out_of_range_params() {
    let output = Command::new(binary_path())
        .args(["build", "-n", "5"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "N=5 is below the valid range");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("num_points"), "Error should name the parameter");
}

#[test]
fn instance_command_with_builtin_seed() {
    let output = Command::new(binary_path())
        .args(["instance", "--builtin", "-n", "30"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    // 30 - 21 = 9 cages -> 9 petals
    assert!(stdout.contains("o petal_0"));
    assert!(stdout.contains("o petal_8"));
    assert!(!stdout.contains("o petal_9"));
    assert!(stdout.contains("\nv "), "Should contain vertex records");
    assert!(stdout.contains("\nf "), "Should contain face records");
}

#[test]
fn instance_command_rejects_multi_object_seed() {
    let seed_path = std::env::temp_dir().join("bloom_test_two_objects.obj");
    let two_objects = "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
                       o b\nv 2 0 0\nv 3 0 0\nv 2 1 0\nf 4 5 6\n";
    std::fs::write(&seed_path, two_objects).expect("Failed to write temp seed");

    let output = Command::new(binary_path())
        .args(["instance", seed_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Two objects must be rejected");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("exactly one object"),
        "Error should explain the selection rule, got: {}",
        stderr
    );
    // Nothing should have been produced.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("o petal_0"));

    let _ = std::fs::remove_file(&seed_path);
}

#[test]
fn instance_command_rejects_faceless_seed() {
    let seed_path = std::env::temp_dir().join("bloom_test_faceless.obj");
    std::fs::write(&seed_path, "o cloud\nv 0 0 0\nv 1 0 0\n")
        .expect("Failed to write temp seed");

    let output = Command::new(binary_path())
        .args(["instance", seed_path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "A faceless object is not a mesh");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no faces"), "got: {}", stderr);

    let _ = std::fs::remove_file(&seed_path);
}
