//! Platform-specific path utilities.

use crate::error::{LauncherError, Result};
use std::path::{Component, Path, PathBuf};

/// Separator between classpath entries.
///
/// # Platform Behavior
/// - **Linux/macOS**: `:`
/// - **Windows**: `;`
#[cfg(windows)]
pub const CLASSPATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const CLASSPATH_SEPARATOR: char = ':';

/// Resolve `path` against the current directory and drop `.` and `..`
/// components lexically.
///
/// The path does not need to exist, and symlinks are not followed.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| LauncherError::io_with_path(e, path))?;
    Ok(normalize_lexically(&absolute))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pops past the root.
                if matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Whether an executable name already names a path rather than a bare
/// command to look up.
pub fn has_path_separator(name: &str) -> bool {
    #[cfg(windows)]
    {
        name.contains('/') || name.contains('\\')
    }
    #[cfg(not(windows))]
    {
        name.contains('/')
    }
}
