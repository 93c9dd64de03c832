use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use filetime::{FileTime, set_file_times};
#[cfg(target_os = "linux")]
use tracing::warn;

use crate::spec::SpecCopyOptions;

////////////////////////////////////////////////////////////////////////////////
// #region Metadata

/// Replicate metadata of `path_src` onto `path_dst`.
///
/// Order matches a classic "copy stat": times, then xattrs, then mode last so a
/// read-only source mode does not block the earlier steps. Ownership is never
/// touched.
pub(crate) fn copy_metadata(
    path_src: &Path,
    path_dst: &Path,
    spec_cp_options: &SpecCopyOptions,
) -> Result<(), io::Error> {
    let stat_src = fs::metadata(path_src)?;

    if spec_cp_options.if_preserve_times {
        let file_time_access = FileTime::from_last_access_time(&stat_src);
        let file_time_modify = FileTime::from_last_modification_time(&stat_src);
        set_file_times(path_dst, file_time_access, file_time_modify)?;
    }

    #[cfg(target_os = "linux")]
    {
        if spec_cp_options.if_preserve_xattrs {
            copy_xattrs_linux(path_src, path_dst);
        }
    }

    fs::set_permissions(path_dst, stat_src.permissions())?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_src: &Path, path_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_src) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to list xattrs of {} ({e})", path_src.display());
            return;
        }
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_dst, &name, &raw_value) {
            warn!(
                "Failed to set xattr {} on {} ({e})",
                name.to_string_lossy(),
                path_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Traversal

/// Names of the immediate entries of `path_dir`, in listing order.
pub(crate) fn list_entry_names(path_dir: &Path) -> Result<Vec<OsString>, io::Error> {
    fs::read_dir(path_dir)?
        .map(|entry_res| entry_res.map(|entry| entry.file_name()))
        .collect()
}

/// Stable identity of a directory, used to spot symlink cycles.
#[cfg(unix)]
pub(crate) fn dir_identity(stat_dir: &fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((stat_dir.dev(), stat_dir.ino()))
}

#[cfg(not(unix))]
pub(crate) fn dir_identity(_stat_dir: &fs::Metadata) -> Option<(u64, u64)> {
    None
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
