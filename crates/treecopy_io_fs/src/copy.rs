//! Merge-aware tree traversal and copy orchestration.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::vec;

use tracing::{debug, info};

use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{CopyTreeError, EnumCopyStage, SpecCopyOptions};
use crate::util::{copy_metadata, dir_identity, list_entry_names};

/// One source directory whose entries are still being copied.
#[derive(Debug)]
struct SpecCopyFrame {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    id_dir_src: Option<(u64, u64)>,
    iter_names: vec::IntoIter<OsString>,
}

#[derive(Debug)]
struct SpecCopyContext<'a> {
    spec_cp_options: &'a SpecCopyOptions,
    builder_cp_report: ReportCopyBuilder,
    l_frames: Vec<SpecCopyFrame>,
}

/// Copy a directory tree from `dir_source` onto `dir_destination`, merging
/// into whatever already exists there.
///
/// Shorthand for [`copy_tree_with_options`] with [`SpecCopyOptions::default`].
pub fn copy_tree<P, Q>(dir_source: P, dir_destination: Q) -> Result<ReportCopy, CopyTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    copy_tree_with_options(dir_source, dir_destination, &SpecCopyOptions::default())
}

/// Copy a directory tree from `dir_source` onto `dir_destination`.
///
/// For every directory level:
/// 1. If nothing exists at the destination, create it (with missing parents)
///    and copy the source directory's metadata onto it. An existing
///    destination is reused as-is, its own metadata untouched.
/// 2. Every entry of the source directory is replicated in listing order.
///    Directories (symlinks followed) are descended into before the next
///    sibling is handled; everything else is copied as a file with its
///    metadata, overwriting any same-named destination file.
///
/// Nothing is ever deleted from the destination. The first failure stops the
/// run and is returned; entries already written stay on disk.
pub fn copy_tree_with_options<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_cp_options: &SpecCopyOptions,
) -> Result<ReportCopy, CopyTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref();
    let path_dir_dst = dir_destination.as_ref();
    info!(
        "Copying tree {} -> {}",
        path_dir_src.display(),
        path_dir_dst.display()
    );

    let mut spec_cp_ctx = SpecCopyContext {
        spec_cp_options,
        builder_cp_report: ReportCopyBuilder::default(),
        l_frames: Vec::new(),
    };
    if let Err(e) = spec_cp_ctx.walk(path_dir_src, path_dir_dst) {
        debug!(stage = ?e.stage(), path = %e.path().display(), "Copy aborted: {e}");
        return Err(e);
    }

    let report_copy = spec_cp_ctx.builder_cp_report.build();
    info!("{report_copy}");
    Ok(report_copy)
}

fn dir_error(stage: EnumCopyStage, path: &Path, source: io::Error) -> CopyTreeError {
    CopyTreeError::Dir {
        stage,
        path: path.to_path_buf(),
        source,
    }
}

fn file_error(
    stage: EnumCopyStage,
    path_src: &Path,
    path_dst: &Path,
    source: io::Error,
) -> CopyTreeError {
    CopyTreeError::File {
        stage,
        path_src: path_src.to_path_buf(),
        path_dst: path_dst.to_path_buf(),
        source,
    }
}

impl SpecCopyContext<'_> {
    fn walk(&mut self, path_dir_src: &Path, path_dir_dst: &Path) -> Result<(), CopyTreeError> {
        let id_dir_src = fs::metadata(path_dir_src)
            .ok()
            .and_then(|stat_src| dir_identity(&stat_src));
        self.enter_directory(
            path_dir_src.to_path_buf(),
            path_dir_dst.to_path_buf(),
            id_dir_src,
        )?;

        while let Some(spec_frame) = self.l_frames.last_mut() {
            let Some(name) = spec_frame.iter_names.next() else {
                self.l_frames.pop();
                continue;
            };
            let path_src = spec_frame.path_dir_src.join(&name);
            let path_dst = spec_frame.path_dir_dst.join(&name);

            // Stat failures fall through to the file copy, which reports them.
            match fs::metadata(&path_src) {
                Ok(stat_src) if stat_src.is_dir() => {
                    self.enter_directory(path_src, path_dst, dir_identity(&stat_src))?;
                }
                _ => self.copy_file_entry(&path_src, &path_dst)?,
            }
        }
        Ok(())
    }

    fn enter_directory(
        &mut self,
        path_dir_src: PathBuf,
        path_dir_dst: PathBuf,
        id_dir_src: Option<(u64, u64)>,
    ) -> Result<(), CopyTreeError> {
        if let Some(id_dir) = id_dir_src
            && let Some(spec_frame_ancestor) = self
                .l_frames
                .iter()
                .find(|f| f.id_dir_src == Some(id_dir))
        {
            return Err(CopyTreeError::Cycle {
                path: path_dir_src,
                path_ancestor: spec_frame_ancestor.path_dir_src.clone(),
            });
        }

        let if_exists = path_dir_dst
            .try_exists()
            .map_err(|e| dir_error(EnumCopyStage::InspectDestination, &path_dir_dst, e))?;
        if if_exists {
            debug!("Merging into existing directory: {}", path_dir_dst.display());
            self.builder_cp_report.add_dir_merged();
        } else {
            fs::create_dir_all(&path_dir_dst)
                .map_err(|e| dir_error(EnumCopyStage::CreateDir, &path_dir_dst, e))?;
            copy_metadata(&path_dir_src, &path_dir_dst, self.spec_cp_options)
                .map_err(|e| dir_error(EnumCopyStage::CopyDirMetadata, &path_dir_dst, e))?;
            debug!("Created directory: {}", path_dir_dst.display());
            self.builder_cp_report.add_dir_created();
        }

        let l_names = list_entry_names(&path_dir_src)
            .map_err(|e| dir_error(EnumCopyStage::ReadDir, &path_dir_src, e))?;
        self.l_frames.push(SpecCopyFrame {
            path_dir_src,
            path_dir_dst,
            id_dir_src,
            iter_names: l_names.into_iter(),
        });
        Ok(())
    }

    fn copy_file_entry(&mut self, path_src: &Path, path_dst: &Path) -> Result<(), CopyTreeError> {
        let n_bytes = fs::copy(path_src, path_dst)
            .map_err(|e| file_error(EnumCopyStage::CopyFile, path_src, path_dst, e))?;
        copy_metadata(path_src, path_dst, self.spec_cp_options)
            .map_err(|e| file_error(EnumCopyStage::CopyFileMetadata, path_src, path_dst, e))?;
        debug!("Copied file: {} ({n_bytes} bytes)", path_dst.display());
        self.builder_cp_report.add_file_copied(n_bytes);
        Ok(())
    }
}
