#![forbid(unsafe_code)]

//! Test harness for kview.
//!
//! - [`Fixture`]: a headless surface with an `#app` container and a runtime
//!   over it.
//! - [`models`]: small demo models and their views.
//! - [`outline`]: deterministic dumps of the element tree, as text, JSON, or
//!   a digest.
//! - [`assert_snapshot!`]: compare an outline against
//!   `tests/snapshots/<name>.snap`. Run with `BLESS=1` to create or update
//!   snapshot files.

pub mod fixture;
pub mod models;
pub mod outline;

use std::fs;
use std::path::{Path, PathBuf};

pub use fixture::Fixture;
pub use outline::{outline, outline_digest, outline_json};

/// Compare the outline of an element against a stored snapshot.
///
/// ```ignore
/// assert_snapshot!("calculator", &fixture.app());
/// ```
#[macro_export]
macro_rules! assert_snapshot {
    ($name:expr, $element:expr) => {
        $crate::check_snapshot(
            $name,
            &$crate::outline($element),
            env!("CARGO_MANIFEST_DIR"),
        )
    };
}

/// Location of snapshot `name` under `manifest_dir`.
#[must_use]
pub fn snapshot_path(manifest_dir: &str, name: &str) -> PathBuf {
    Path::new(manifest_dir)
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.snap"))
}

fn blessing() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1")
}

/// Backend of [`assert_snapshot!`]. Panics on mismatch or a missing file.
pub fn check_snapshot(name: &str, actual: &str, manifest_dir: &str) {
    let path = snapshot_path(manifest_dir, name);
    if blessing() {
        if let Some(dir) = path.parent() {
            if let Err(err) = fs::create_dir_all(dir) {
                panic!("cannot create {}: {err}", dir.display());
            }
        }
        if let Err(err) = fs::write(&path, format!("{}\n", actual.trim_end())) {
            panic!("cannot write {}: {err}", path.display());
        }
        tracing::info!(target: "kview::harness", snapshot = name, "snapshot blessed");
        return;
    }
    let expected = match fs::read_to_string(&path) {
        Ok(expected) => expected,
        Err(err) => panic!(
            "snapshot {name} missing at {} ({err}); run with BLESS=1 to create it",
            path.display()
        ),
    };
    if expected.trim_end() != actual.trim_end() {
        panic!(
            "snapshot {name} mismatch\n{}\nrun with BLESS=1 to accept",
            line_diff(expected.trim_end(), actual.trim_end())
        );
    }
}

/// Line-by-line diff, `-` for expected and `+` for actual.
fn line_diff(expected: &str, actual: &str) -> String {
    let expected: Vec<_> = expected.lines().collect();
    let actual: Vec<_> = actual.lines().collect();
    let mut out = String::new();
    for i in 0..expected.len().max(actual.len()) {
        match (expected.get(i), actual.get(i)) {
            (Some(e), Some(a)) if e == a => {
                out.push_str("  ");
                out.push_str(e);
            }
            (e, a) => {
                if let Some(e) = e {
                    out.push_str("- ");
                    out.push_str(e);
                    out.push('\n');
                }
                if let Some(a) = a {
                    out.push_str("+ ");
                    out.push_str(a);
                    out.push('\n');
                }
                out.pop();
            }
        }
        out.push('\n');
    }
    out
}
