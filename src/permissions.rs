//! Permissions on the delivered result tree.
//!
//! The routing platform may hand results to a consumer running as another
//! user, so the module can widen permissions after conversion. The scope is
//! an explicit, configurable policy instead of an unconditional chmod.

use camino::Utf8Path;
use serde::Deserialize;
use std::io;
use std::path::Path;

/// Who must be able to read and write the delivered result tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    /// Leave everything as created.
    Owner,
    /// Group members get read/write, and traversal on directories.
    Group,
    /// Everyone gets full access. This is what legacy downstream consumers
    /// of the archive delivery expect.
    World,
}

impl PermissionPolicy {
    /// `(directory, file)` mode bits, or `None` when nothing is changed.
    fn modes(self) -> Option<(u32, u32)> {
        match self {
            PermissionPolicy::Owner => None,
            PermissionPolicy::Group => Some((0o775, 0o664)),
            PermissionPolicy::World => Some((0o777, 0o777)),
        }
    }
}

/// Apply `policy` to `root` and everything under it.
pub(crate) fn apply_recursive(root: &Utf8Path, policy: PermissionPolicy) -> io::Result<()> {
    match policy.modes() {
        Some((dir_mode, file_mode)) => walk(root.as_std_path(), dir_mode, file_mode),
        None => Ok(()),
    }
}

/// Apply `policy` to a single path.
pub(crate) fn apply_one(path: &Utf8Path, policy: PermissionPolicy) -> io::Result<()> {
    match policy.modes() {
        Some((dir_mode, file_mode)) => {
            let mode = if path.is_dir() { dir_mode } else { file_mode };
            set_mode(path.as_std_path(), mode)
        }
        None => Ok(()),
    }
}

fn walk(path: &Path, dir_mode: u32, file_mode: u32) -> io::Result<()> {
    if path.is_dir() {
        set_mode(path, dir_mode)?;
        for entry in fs_err::read_dir(path)? {
            walk(&entry?.path(), dir_mode, file_mode)?;
        }
        Ok(())
    } else {
        set_mode(path, file_mode)
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs_err::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

// Mode bits do not translate to other platforms. The delivery contract is
// only meaningful on the unix hosts the platform deploys to.
#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
