// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output writing. Nothing is ever written to the final path directly: bytes go
// to a hidden sibling file which is renamed over the target once complete, so
// the target either holds a whole document or keeps its previous state.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use bindery_core::error::{BuildError, Result};
use tracing::{debug, instrument};

/// Write `bytes` to `target` atomically.
#[instrument(skip_all, fields(target = %target.display(), bytes_len = bytes.len()))]
pub fn write_atomically(target: &Path, bytes: &[u8]) -> Result<()> {
    persist_with(target, |file| file.write_all(bytes))
}

/// Copy `source` to `target` byte for byte, atomically.
#[instrument(skip_all, fields(source = %source.display(), target = %target.display()))]
pub fn copy_atomically(source: &Path, target: &Path) -> Result<u64> {
    let mut input = File::open(source).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => BuildError::not_found(source),
        _ => BuildError::write_failure(source, err),
    })?;

    let mut copied = 0;
    persist_with(target, |file| {
        copied = std::io::copy(&mut input, file)?;
        Ok(())
    })?;
    Ok(copied)
}

/// Create a temporary sibling of `target`, fill it, sync it, rename it into
/// place. On any error the temporary file is removed and `target` untouched.
fn persist_with<F>(target: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = tempfile::Builder::new()
        .prefix(".bindery-")
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(|err| BuildError::write_failure(target, err))?;

    fill(staged.as_file_mut())
        .and_then(|()| staged.as_file_mut().flush())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|err| BuildError::write_failure(target, err))?;

    staged
        .persist(target)
        .map_err(|err| BuildError::write_failure(target, err.error))?;

    debug!("Output persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        std::fs::write(&target, b"old").unwrap();

        write_atomically(&target, b"new contents").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new contents");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn copy_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.pdf");
        let target = dir.path().join("out.pdf");
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        std::fs::write(&source, &payload).unwrap();

        let copied = copy_atomically(&source, &target).unwrap();

        assert_eq!(copied, payload.len() as u64);
        assert_eq!(std::fs::read(&target).unwrap(), payload);
    }

    #[test]
    fn copy_of_missing_source_is_not_found_and_leaves_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        std::fs::write(&target, b"previous").unwrap();

        let err = copy_atomically(&dir.path().join("missing.pdf"), &target).unwrap_err();

        assert!(matches!(err, BuildError::NotFound { .. }));
        assert_eq!(std::fs::read(&target).unwrap(), b"previous");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_directory_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("no/such/dir/out.pdf");

        let err = write_atomically(&target, b"x").unwrap_err();
        assert!(matches!(err, BuildError::WriteFailure { .. }));
        assert!(!target.exists());
    }
}
