//! Headless runs end to end
//!
//! Builds the companion the way the binary does (clap args, session setup)
//! and checks the JSON stream.

use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::Value;

use companion_sim::headless::{self, HeadlessOptions, Press};
use companion_sim::session::{open_storage, start_companion};
use companion_sim::Args;

fn run_with(argv: &[&str], script: Option<Vec<Press>>) -> Vec<Value> {
    let mut full = vec!["companion-sim", "--headless"];
    full.extend_from_slice(argv);
    let args = Args::parse_from(full);

    let start = args.start_millis();
    let storage = open_storage(&args).unwrap();
    let mut companion = start_companion(&args, storage, start).unwrap();

    let mut options = HeadlessOptions {
        seconds: args.seconds,
        frame_ms: args.frame_ms,
        start,
        ..HeadlessOptions::default()
    };
    if let Some(script) = script {
        options.script = script;
    }

    let mut out = Vec::new();
    let lines = headless::run(&mut companion, &options, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let reports: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), lines as usize);
    reports
}

fn field<'a>(report: &'a Value, name: &str) -> &'a Value {
    report.get(name).unwrap_or_else(|| panic!("missing {name}"))
}

#[test]
fn test_one_line_per_second() {
    let reports = run_with(&["--seconds", "5", "--seed", "1"], None);
    let seconds: Vec<u64> = reports
        .iter()
        .map(|r| field(r, "second").as_u64().unwrap())
        .collect();
    assert_eq!(seconds, vec![1, 2, 3, 4, 5]);
    assert_eq!(field(&reports[0], "mode"), "face");
    assert!(field(&reports[0], "panel_frames").as_u64().unwrap() > 0);
}

#[test]
fn test_default_script_cycles_modes() {
    let reports = run_with(&["--seconds", "16", "--seed", "1"], None);
    let mode = |second: usize| field(&reports[second - 1], "mode").clone();

    assert_eq!(mode(3), "face");
    assert_eq!(mode(4), "clock");
    assert_eq!(mode(7), "sysinfo");
    assert_eq!(mode(10), "face");
    assert_eq!(field(&reports[14], "last_event"), "LongPress");

    // Autosaved five seconds after the last mode change
    assert_eq!(field(&reports[9], "config_dirty"), true);
    assert_eq!(field(&reports[15], "config_dirty"), false);
}

#[test]
fn test_idle_dims_then_sleeps() {
    let reports = run_with(&["--seconds", "150", "--seed", "1"], None);

    assert_eq!(field(&reports[39], "dimmed"), false);
    assert_eq!(field(&reports[45], "dimmed"), true);
    assert_eq!(field(&reports[45], "brightness"), 38);
    assert_eq!(field(&reports[45], "contrast"), 38);
    assert_eq!(field(&reports[149], "mode"), "sleep");

    // Mode changes were autosaved long before sleep
    assert_eq!(field(&reports[30], "config_dirty"), false);
}

#[test]
fn test_same_seed_same_output() {
    let a = run_with(&["--seconds", "30", "--seed", "99"], None);
    let b = run_with(&["--seconds", "30", "--seed", "99"], None);
    assert_eq!(a, b);
}

#[test]
fn test_runs_across_clock_rollover() {
    let reports = run_with(
        &["--seconds", "8", "--seed", "4", "--clock-offset", "5000"],
        None,
    );
    let now = |second: usize| field(&reports[second - 1], "now").as_u64().unwrap();
    assert!(now(4) > now(6), "clock wrapped");
    assert_eq!(field(&reports[3], "mode"), "clock");
    assert_eq!(field(&reports[6], "mode"), "sysinfo");
}

#[test]
fn test_cli_overrides_and_custom_script() {
    let reports = run_with(
        &["--seconds", "4", "--seed", "2", "--brightness", "60", "--dim-timeout", "2"],
        Some(Vec::new()),
    );
    assert_eq!(field(&reports[0], "brightness"), 60);
    assert_eq!(field(&reports[3], "dimmed"), true);
    assert_eq!(field(&reports[3], "brightness"), 18);
}

#[test]
fn test_rejects_uneven_frame_step() {
    let args = Args::parse_from(["companion-sim", "--headless", "--frame-ms", "7"]);
    let storage = open_storage(&args).unwrap();
    let mut companion = start_companion(&args, storage, 0).unwrap();
    let options = HeadlessOptions {
        frame_ms: 7,
        ..HeadlessOptions::default()
    };
    assert!(headless::run(&mut companion, &options, &mut Vec::<u8>::new()).is_err());
}
