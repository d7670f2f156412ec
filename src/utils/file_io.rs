use std::path::Path;

use tokio::fs;
use tokio::fs::DirBuilder;
use tracing::debug;
use tracing::info;

use crate::FatalError;
use crate::Result;

fn workspace_error(
    path: &Path,
    source: std::io::Error,
) -> crate::Error {
    FatalError::Workspace {
        path: path.to_path_buf(),
        source,
    }
    .into()
}

/// Creates exactly one directory with the given permission bits.
/// Fails if the directory already exists: workspaces are expected to be pristine.
pub async fn create_workspace_dir(
    path: &Path,
    mode: u32,
) -> Result<()> {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    builder.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path).await.map_err(|e| workspace_error(path, e))?;
    debug!("created workspace {:?}", path);
    Ok(())
}

/// Wipes `path` if it is an existing directory, then creates it afresh.
/// Missing parents are created as well.
pub async fn recreate_root_dir(
    path: &Path,
    mode: u32,
) -> Result<()> {
    if is_dir(path).await {
        info!("rm -rf {:?}", path);
        fs::remove_dir_all(path).await.map_err(|e| workspace_error(path, e))?;
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| workspace_error(parent, e))?;
    }

    create_workspace_dir(path, mode).await
}

/// Removes a lock artifact left in `workspace` by an unclean shutdown.
/// Returns whether a file was removed.
pub async fn remove_stale_lock(
    workspace: &Path,
    lock_file: &str,
) -> Result<bool> {
    let lock_path = workspace.join(lock_file);
    match fs::metadata(&lock_path).await {
        Ok(meta) if meta.is_file() => {
            fs::remove_file(&lock_path).await.map_err(|e| workspace_error(&lock_path, e))?;
            info!("removed stale lock {:?}", lock_path);
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}
