//! Structural tests for layer boundaries.
//!
//! These tests scan source files so that the domain stays pure and the
//! application layer only talks to the outside world through its ports.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and report whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Non-comment lines outside `#[cfg(test)]` blocks, with 1-based line numbers.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::new();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            !in_test && !trimmed.starts_with("//")
        })
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

fn src_dir(layer: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

fn relative(path: &Path) -> String {
    path.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Every production line in `layer` containing one of `forbidden`.
fn find_violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir(layer)) {
        // output/tests.rs is a test module included via `#[cfg(test)] mod tests;`
        if file.file_name().and_then(|n| n.to_str()) == Some("tests.rs") {
            continue;
        }
        for (lineno, line) in production_lines(&file) {
            for pattern in forbidden {
                if line.contains(pattern) {
                    violations.push(format!("{}:{lineno}: `{pattern}` in: {}", relative(&file), line.trim()));
                }
            }
        }
    }
    violations
}

#[test]
fn domain_has_no_outward_dependencies() {
    let violations = find_violations(
        "domain",
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "std::fs",
            "std::process",
            "std::env",
            "tracing::",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_reaches_outside_only_through_ports() {
    let violations = find_violations(
        "application",
        &["crate::infra", "crate::commands", "crate::output", "std::fs", "std::process"],
    );
    assert!(
        violations.is_empty(),
        "application/ must use port traits:\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let mut violations = find_violations("commands", &["json: bool"]);
    for file in collect_rs_files(&src_dir("commands")) {
        for (lineno, line) in production_lines(&file) {
            let trimmed = line.trim();
            if trimmed.starts_with("if json") || trimmed.starts_with("if !json") {
                violations.push(format!("{}:{lineno}: inline JSON branch: {trimmed}", relative(&file)));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "commands/ must branch on app.is_json():\n{}",
        violations.join("\n")
    );
}

#[test]
fn no_unwrap_or_expect_in_production_code() {
    let mut violations = Vec::new();
    for layer in ["domain", "application", "infra", "commands", "output"] {
        violations.extend(find_violations(layer, &[".unwrap()", ".expect("]));
    }
    assert!(
        violations.is_empty(),
        "propagate errors instead of panicking:\n{}",
        violations.join("\n")
    );
}
