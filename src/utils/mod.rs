//! Utility functions and helpers

use std::path::Path;

/// Get relative path from base to target
pub fn relative_path(from: &Path, to: &Path) -> Option<String> {
    pathdiff::diff_paths(to, from).map(|p| path_to_module_id(&p))
}

/// Display a path relative to `base` when possible
pub fn display_path(base: &Path, path: &Path) -> String {
    relative_path(base, path).unwrap_or_else(|| path_to_module_id(path))
}

/// Convert a file path to a `/`-separated module ID
pub fn path_to_module_id(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Format duration as human-readable string
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f64();

    if secs >= 60.0 {
        let mins = (secs / 60.0).floor() as u64;
        let remaining_secs = secs - (mins as f64 * 60.0);
        format!("{}m {:.2}s", mins, remaining_secs)
    } else if secs >= 1.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.0}ms", secs * 1000.0)
    }
}
