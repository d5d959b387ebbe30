//! Recursive directory copy used to vendor stack bases into a cluster tree.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copies `src` into `dst`, recreating the directory structure.
///
/// File contents and permission bits are preserved; directories receive the mode of
/// their source. Existing files in `dst` are overwritten, others are left alone.
pub fn copy_dir<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<usize> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    let mut copied = 0;
    let mut dir_permissions = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
            dir_permissions.push((target, entry.metadata()?.permissions()));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            copied += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            // fs::copy carries the permission bits over.
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    // Applied last so read-only source directories can still be filled.
    for (dir, permissions) in dir_permissions.into_iter().rev() {
        fs::set_permissions(dir, permissions)?;
    }

    debug!("Copied {} file(s) from {} to {}", copied, src.display(), dst.display());
    Ok(copied)
}

/// Replaces `dst` with a fresh copy of `src`.
pub fn replace_dir<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<usize> {
    let dst = dst.as_ref();
    if dst.exists() {
        fs::remove_dir_all(dst)?;
    }
    copy_dir(src, dst)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = fs::read_link(src)?;
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(link, dst)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)?;
    Ok(())
}
