//! Architectural Enforcement Integration Tests
//!
//! Source-scanning checks that keep the companion loop honest:
//! - No sleep calls anywhere in the companion crates
//! - No wall-clock reads in the core outside the clock module
//! - Filesystem access in the core confined to config storage
//! - No `unwrap()`/`expect()` in production code
//!
//! Shared scanning helpers live here; the policies live in `tests/`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// A forbidden pattern found in production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Offending line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Code portion of a line, without `//` comments
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Index of the first line of the `#[cfg(test)]` module, if any
///
/// Test modules sit at the bottom of each file, so everything from here on
/// is test code.
pub fn test_region_start(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|l| l.trim() == "#[cfg(test)]")
}

/// Production lines of `content` containing any of `patterns`
pub fn scan_content(path: &Path, content: &str, patterns: &[&str]) -> Vec<Violation> {
    let lines: Vec<&str> = content.lines().collect();
    let end = test_region_start(&lines).unwrap_or(lines.len());

    lines[..end]
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let code = code_part(line);
            patterns.iter().any(|p| code.contains(p))
        })
        .map(|(idx, line)| Violation {
            path: path.to_path_buf(),
            line: idx + 1,
            text: line.trim().to_string(),
        })
        .collect()
}

/// Scan every source under `dir`, skipping files `allow` accepts
pub fn scan_dir(dir: &str, patterns: &[&str], allow: impl Fn(&Path) -> bool) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_sources(dir) {
        if allow(&path) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        violations.extend(scan_content(&path, &content, patterns));
    }
    violations
}

/// Print violations and fail
pub fn report(title: &str, hint: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!("\n{hint}");
    panic!("\nFound {} violation(s). Fix these before merging!", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_are_ignored() {
        let content = "let a = 1; // thread::sleep(x)\n/// Instant::now() in docs\n";
        let found = scan_content(Path::new("x.rs"), content, &["::sleep(", "Instant::now"]);
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn test_test_module_is_ignored() {
        let content = "fn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() { x.unwrap(); }\n}\n";
        assert!(scan_content(Path::new("x.rs"), content, &[".unwrap()"]).is_empty());
    }

    #[test]
    fn test_violation_location() {
        let content = "fn a() {}\nfn b() { std::thread::sleep(d); }\n";
        let found = scan_content(Path::new("x.rs"), content, &["::sleep("]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].to_string(), "x.rs:2 - fn b() { std::thread::sleep(d); }");
    }

    #[test]
    fn test_finds_companion_sources() {
        assert!(!rust_sources("companion/core/src").is_empty());
    }
}
