//! Runs a mirrored gist file as a shell script.

use crate::error::GistError;
use crate::types::File;
use std::path::Path;
use std::process::Command;

/// Mode a file is given while it runs.
pub const EXEC_MODE: u32 = 0o755;

/// Permission bits access, split out so callers can observe chmod calls.
pub trait PermissionOps {
    /// Returns the permission bits (`0o777` mask) of `path`.
    fn mode(&self, path: &Path) -> Result<u32, GistError>;
    fn set_mode(&self, path: &Path, mode: u32) -> Result<(), GistError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsPermissions;

#[cfg(unix)]
impl PermissionOps for OsPermissions {
    fn mode(&self, path: &Path) -> Result<u32, GistError> {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path).map_err(|e| GistError::io(path, e))?;
        Ok(metadata.permissions().mode() & 0o777)
    }
    fn set_mode(&self, path: &Path, mode: u32) -> Result<(), GistError> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| GistError::io(path, e))
    }
}

#[cfg(not(unix))]
impl PermissionOps for OsPermissions {
    fn mode(&self, path: &Path) -> Result<u32, GistError> {
        std::fs::metadata(path).map_err(|e| GistError::io(path, e))?;
        Ok(EXEC_MODE)
    }
    fn set_mode(&self, _path: &Path, _mode: u32) -> Result<(), GistError> {
        Ok(())
    }
}

/// Puts the original mode back when dropped.
struct ModeGuard<'a, P: PermissionOps> {
    perms: &'a P,
    path: &'a Path,
    original: u32,
}

impl<P: PermissionOps> Drop for ModeGuard<'_, P> {
    fn drop(&mut self) {
        if let Err(_e) = self.perms.set_mode(self.path, self.original) {
            #[cfg(feature = "logging")]
            tracing::warn!("Failed to restore mode {:o}: {}", self.original, _e);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Runner<P = OsPermissions> {
    shell: String,
    perms: P,
}

impl Runner<OsPermissions> {
    pub fn new(shell: impl Into<String>) -> Self {
        Self::with_permissions(shell, OsPermissions)
    }
}

impl<P: PermissionOps> Runner<P> {
    pub fn with_permissions(shell: impl Into<String>, perms: P) -> Self {
        Self {
            shell: shell.into(),
            perms,
        }
    }

    /// Runs `file` through the shell with this process's stdio attached.
    ///
    /// The file is made executable for the duration of the run and its mode is
    /// restored afterwards, whether or not the script succeeds. `args` become
    /// the script's positional parameters.
    pub fn execute(&self, file: &File, args: &[String]) -> Result<(), GistError> {
        let path = file.path.as_path();
        let original = self.perms.mode(path)?;
        let _guard = if original != EXEC_MODE {
            self.perms.set_mode(path, EXEC_MODE)?;
            #[cfg(feature = "logging")]
            tracing::debug!("chmod {:o} -> {:o} {}", original, EXEC_MODE, path.display());
            Some(ModeGuard {
                perms: &self.perms,
                path,
                original,
            })
        } else {
            None
        };
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg("\"$0\" \"$@\"")
            .arg(path)
            .args(args)
            .status()
            .map_err(|e| GistError::spawn(&self.shell, e))?;
        GistError::check_status(file.filename.as_str(), status)
    }
}

/// True when the file's extension is in `exts` (given without the dot).
pub fn is_runnable(file: &File, exts: &[String]) -> bool {
    Path::new(&file.filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| exts.iter().any(|allowed| allowed == ext))
}
