//! Integration Test: Loop Discipline
//!
//! The companion runs one cooperative loop. Every component gets the same
//! timestamp per iteration and nothing in the loop may block.
//!
//! **Policy**:
//! - No sleep calls in any companion crate. The simulator waits on input
//!   with a poll timeout instead.
//! - The core never reads a clock itself. `time.rs` owns the one
//!   `Instant`-backed clock that hosts read once per iteration.
//! - Filesystem access in the core lives in config storage and the settings
//!   loader, which only run on load, autosave, flush and factory reset.

use std::path::Path;

use architectural_enforcement::{report, rust_sources, scan_dir};

const COMPANION_DIRS: [&str; 2] = ["companion/core/src", "companion/sim/src"];

fn allow_none(_: &Path) -> bool {
    false
}

#[test]
fn test_no_sleep_in_companion_code() {
    let violations: Vec<_> = COMPANION_DIRS
        .iter()
        .flat_map(|dir| scan_dir(dir, &["::sleep(", ".sleep("], allow_none))
        .collect();

    report(
        "CRITICAL: Sleep calls found in companion code!",
        "Pace the loop with timestamps and wrapping deadlines, or wait on input.",
        &violations,
    );
}

#[test]
fn test_core_never_reads_wall_clock() {
    let violations = scan_dir(
        "companion/core/src",
        &["Instant::now", "SystemTime", "Local::now", "Utc::now"],
        |path| path.ends_with("time.rs"),
    );

    report(
        "Clock reads found in the core!",
        "Take `now: Millis` as a parameter; hosts read the clock once per loop.",
        &violations,
    );
}

#[test]
fn test_core_io_stays_in_config_storage() {
    let violations = scan_dir(
        "companion/core/src",
        &["std::fs", "fs::", "File::", "std::net"],
        |path| path.ends_with("config/store.rs") || path.ends_with("config/settings.rs"),
    );

    report(
        "Filesystem or network access found outside config storage!",
        "Route persistence through `ConfigStorage`.",
        &violations,
    );
}

#[test]
fn test_scans_are_not_vacuous() {
    for dir in COMPANION_DIRS {
        assert!(
            rust_sources(dir).len() >= 3,
            "expected sources under {dir}; is the workspace layout intact?"
        );
    }
}
