//! Process environment setup
//!
//! The installer ships next to bundled adb/fastboot binaries: its own
//! directory is prepended to PATH so those win over system copies, and
//! the working directory moves there so downloaded artifacts stay
//! isolated next to the installer.

use std::path::PathBuf;
use tracing::warn;

/// Prepend the executable's directory to PATH and chdir into it.
///
/// A chdir failure is only a warning (artifacts land in the caller's
/// cwd instead); failure to locate the executable or rebuild PATH is a
/// prerequisite error.
pub fn prepare_environment() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut paths = vec![dir.clone()];
    if let Some(path) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&path));
    }
    let joined = std::env::join_paths(paths)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::env::set_var("PATH", joined);

    if let Err(e) = std::env::set_current_dir(&dir) {
        warn!(error = %e, "failed to change working directory");
        eprintln!("Warning: failed to change working directory: {e}");
        return Ok(std::env::current_dir()?);
    }
    Ok(dir)
}
