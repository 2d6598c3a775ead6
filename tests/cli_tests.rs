use regex::Regex;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
    trace_path: PathBuf,
    raw_points: usize,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let trace_path = dir.path().join("swipe.csv");

        // Straight swipe along the top row of the built-in qwerty layout, q to t.
        let mut file = File::create(&trace_path).unwrap();
        writeln!(file, "x,y,time").unwrap();
        let mut raw_points = 0;
        for step in 0..=40 {
            writeln!(file, "{},75,{}", 50 + step * 10, step * 10).unwrap();
            raw_points += 1;
        }

        Self {
            dir,
            trace_path,
            raw_points,
        }
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_keyglide"))
        .args(args)
        .output()
        .expect("Failed to execute binary")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_inspect_prints_spatial_summary() {
    let stdout = stdout_of(&run(&["inspect", "--layout", "qwerty", "--cells", "3"]));
    let keys = Regex::new(r"Keys\s+\|\s+29\s").unwrap();
    assert!(keys.is_match(&stdout), "{}", stdout);
    let grid = Regex::new(r"Grid\s+\|\s+32 x 16").unwrap();
    assert!(grid.is_match(&stdout));
}

#[test]
fn test_inspect_saves_descriptor() {
    let ctx = TestContext::new();
    let out = ctx.dir.path().join("dvorak.json");
    stdout_of(&run(&[
        "inspect",
        "-l",
        "Dvorak",
        "--save",
        out.to_str().unwrap(),
    ]));

    // The saved file is a layout in its own right.
    let stdout = stdout_of(&run(&["inspect", "-l", out.to_str().unwrap()]));
    assert!(stdout.contains("SPATIAL MODEL: dvorak"));
}

#[test]
fn test_decode_emits_json_report() {
    let ctx = TestContext::new();
    let stdout = stdout_of(&run(&[
        "decode",
        "--trace",
        ctx.trace_path.to_str().unwrap(),
        "--json",
    ]));

    let start = stdout.find("\n{").expect("no JSON in output") + 1;
    let report: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();
    assert_eq!(report["rawPoints"], ctx.raw_points);
    let word = report["mostProbable"].as_str().unwrap();
    assert!(word.starts_with('q'), "decoded '{}'", word);
    assert!(!report["points"].as_array().unwrap().is_empty());
}

#[test]
fn test_decode_params_file_and_flags() {
    let ctx = TestContext::new();
    let params_path = ctx.dir.path().join("params.json");
    std::fs::write(&params_path, r#"{"search": {"demotion_log_probability": 50.0}}"#).unwrap();

    // A huge demotion makes every point a skip.
    let stdout = stdout_of(&run(&[
        "decode",
        "--params",
        params_path.to_str().unwrap(),
        "--trace",
        ctx.trace_path.to_str().unwrap(),
        "--json",
    ]));
    let start = stdout.find("\n{").unwrap() + 1;
    let report: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();
    assert_eq!(report["mostProbable"], "");

    // The command line wins over the file.
    let stdout = stdout_of(&run(&[
        "decode",
        "--params",
        params_path.to_str().unwrap(),
        "--demotion-log-probability",
        "0.3",
        "--trace",
        ctx.trace_path.to_str().unwrap(),
        "--json",
    ]));
    let start = stdout.find("\n{").unwrap() + 1;
    let report: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();
    assert!(report["mostProbable"].as_str().unwrap().starts_with('q'));
}

#[test]
fn test_simulate_reports_matches() {
    let stdout = stdout_of(&run(&[
        "simulate",
        "--words",
        "hello,world",
        "--jitter",
        "5",
        "--seed",
        "3",
    ]));
    let summary = Regex::new(r"Exact greedy matches: \d+/2").unwrap();
    assert!(summary.is_match(&stdout), "{}", stdout);
    assert!(stdout.contains("Drift"), "{}", stdout);
}

#[test]
fn test_unknown_layout_fails() {
    let output = run(&["inspect", "--layout", "no-such-layout.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("❌"));
}

#[test]
fn test_unknown_layout_name_lists_builtins() {
    let output = run(&["inspect", "--layout", "azerty"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown layout 'azerty'"), "{}", stderr);
    assert!(stderr.contains("qwerty"), "{}", stderr);
}
