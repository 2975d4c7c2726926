//! Whole-file replacement through a sibling temporary file.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MedError, Result};

/// Write a new version of `path` with `write`, then rename it into place.
/// On any failure the temporary file is removed and `path` is left as it was.
pub(crate) fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let tmp = temp_path(path);
    let result = File::create(&tmp)
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    result.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        MedError::storage(path, e)
    })
}

pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
