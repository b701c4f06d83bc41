//! Build-graph layering locks.
//!
//! `forge_kernel` knows nothing of planning and `forge_search` knows nothing
//! of recipes or worlds. Checked on both the manifests and the sources.

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the workspace root from `CARGO_MANIFEST_DIR` of the lock-tests crate.
fn workspace_root() -> PathBuf {
    // lock-tests lives at tests/lock/, so workspace root is ../..
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_path_buf()
}

fn walk(dir: &Path, forbidden: &[&str], violations: &mut Vec<(String, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, forbidden, violations);
        } else if path.extension().is_some_and(|e| e == "rs") {
            check_file(&path, forbidden, violations);
        }
    }
}

fn check_file(path: &Path, forbidden: &[&str], violations: &mut Vec<(String, usize, String)>) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
            continue;
        }
        if forbidden.iter().any(|p| trimmed.contains(p)) {
            violations.push((path.display().to_string(), line_no + 1, line.to_string()));
        }
    }
}

fn assert_crate_clean(crate_dir: &str, forbidden: &[&str]) {
    let root = workspace_root().join(crate_dir);

    let mut violations = Vec::new();
    walk(&root.join("src"), forbidden, &mut violations);
    if !violations.is_empty() {
        let mut msg = format!("{crate_dir} source reaches into a higher layer:\n");
        for (file, line, content) in &violations {
            let _ = writeln!(msg, "  {file}:{line}: {content}");
        }
        panic!("{msg}");
    }

    let manifest = fs::read_to_string(root.join("Cargo.toml"))
        .unwrap_or_else(|e| panic!("{crate_dir}/Cargo.toml must exist: {e}"));
    for (line_no, line) in manifest.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            continue;
        }
        for pattern in forbidden {
            let dep = pattern.replace('_', "-");
            assert!(
                !trimmed.starts_with(&dep),
                "{crate_dir}/Cargo.toml line {}: depends on {dep}",
                line_no + 1
            );
        }
    }
}

#[test]
fn kernel_depends_on_no_other_forge_crate() {
    assert_crate_clean("kernel", &["forge_search", "forge_harness"]);
}

#[test]
fn search_does_not_depend_on_harness() {
    assert_crate_clean("search", &["forge_harness"]);
}
