use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const TEST_OUTPUT_DIR: &str = "test_output";

/// Workspace root: the directory above this crate's manifest.
fn workspace_root() -> &'static Path {
    static ROOT: OnceLock<PathBuf> = OnceLock::new();
    ROOT.get_or_init(|| {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir
            .parent()
            .unwrap_or(manifest_dir)
            .to_path_buf()
    })
}

/// Path for a file written by a test, under `<workspace>/test_output/`.
///
/// `name` may contain subdirectories; they are created on demand so tests
/// can group their files (`"pnm/gray.pgm"`).
pub fn test_output_path(name: &str) -> PathBuf {
    let path = workspace_root().join(TEST_OUTPUT_DIR).join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", parent.display(), e));
    }
    path
}
