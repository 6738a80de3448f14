//! Path utilities for locating test data files.
//!
//! Font files used by the TrueType label tests are not checked in, so they
//! are searched for in a few well-known places.

use std::path::PathBuf;

/// System directories that commonly hold TrueType fonts.
const SYSTEM_FONT_DIRS: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/dejavu",
    "/Library/Fonts",
];

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns `crates/{crate_name}/testdata/`.
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Searches for a test file in multiple locations.
///
/// Checked in order:
/// 1. `TEST_DATA_DIR` (if set)
/// 2. `crates/contour-engine/testdata/`
/// 3. `testdata/` at the workspace root
/// 4. System font directories
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.push(crate_testdata_dir("contour-engine").join(name));
    candidates.push(root.join("testdata").join(name));
    candidates.extend(SYSTEM_FONT_DIRS.iter().map(|dir| PathBuf::from(dir).join(name)));

    candidates.into_iter().find(|path| path.exists())
}

/// Creates a temporary directory for test output, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes `contents` to a file named `name` inside a fresh temporary directory.
///
/// The directory is returned alongside the path so it outlives the test body.
pub fn temp_file_with(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = temp_test_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write temporary test file");
    (dir, path)
}
