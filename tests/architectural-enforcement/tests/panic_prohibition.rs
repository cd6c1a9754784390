//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code in the companion crates propagates errors or
//! falls back; it does not `unwrap()` or `expect()`. Test modules, `tests/`
//! directories and doc comments are exempt.

use std::path::Path;

use architectural_enforcement::{report, scan_dir};

#[test]
fn test_no_unwrap_in_production_code() {
    let violations: Vec<_> = ["companion/core/src", "companion/sim/src"]
        .iter()
        .flat_map(|dir| scan_dir(dir, &[".unwrap()", ".expect("], |_: &Path| false))
        .collect();

    report(
        "unwrap()/expect() found in production code!",
        "Return a Result with `?`, or use an explicit fallback (`unwrap_or`, `let else`).",
        &violations,
    );
}
