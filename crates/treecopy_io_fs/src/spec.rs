//! Copy options and top-level error types.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Traversal step that was running when a copy failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyStage {
    /// Probing whether the destination directory already exists.
    InspectDestination,
    /// Creating a missing destination directory (and its parents).
    CreateDir,
    /// Copying mode/times/xattrs onto a newly created destination directory.
    CopyDirMetadata,
    /// Listing the entries of a source directory.
    ReadDir,
    /// Copying the bytes of one non-directory entry.
    CopyFile,
    /// Copying mode/times/xattrs onto a freshly written file.
    CopyFileMetadata,
}

impl fmt::Display for EnumCopyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_stage = match self {
            Self::InspectDestination => "inspect destination",
            Self::CreateDir => "create directory",
            Self::CopyDirMetadata => "copy directory metadata",
            Self::ReadDir => "read directory",
            Self::CopyFile => "copy file",
            Self::CopyFileMetadata => "copy file metadata",
        };
        f.write_str(c_stage)
    }
}

/// Coarse classification of a [`CopyTreeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyErrorKind {
    /// A source path (or a component of it) does not exist.
    NotFound,
    /// The caller may not create or write an entry.
    PermissionDenied,
    /// A directory symlink leads back to one of its own ancestors.
    Cycle,
    /// Any other storage-layer failure.
    Io,
}

impl From<io::ErrorKind> for EnumCopyErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `copy_tree_with_options`.
///
/// Permission bits are always replicated and ownership never is; the flags
/// below only cover the remaining metadata.
#[derive(Debug, Clone)]
pub struct SpecCopyOptions {
    /// Copy access/modification times onto new directories and copied files.
    pub if_preserve_times: bool,
    /// Copy extended attributes (Linux only, best-effort).
    pub if_preserve_xattrs: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            if_preserve_times: true,
            if_preserve_xattrs: true,
        }
    }
}

/// First failure hit during a copy run.
///
/// The run stops at this failure; entries written before it stay on disk.
#[derive(Debug, Error)]
pub enum CopyTreeError {
    /// Directory-level step failed.
    #[error("Failed to {stage} {}: {source}", .path.display())]
    Dir {
        /// Step that failed.
        stage: EnumCopyStage,
        /// Directory the step was applied to.
        path: PathBuf,
        /// Underlying IO error, unchanged.
        #[source]
        source: io::Error,
    },
    /// File-level step failed.
    #[error("Failed to {stage} {} -> {}: {source}", .path_src.display(), .path_dst.display())]
    File {
        /// Step that failed.
        stage: EnumCopyStage,
        /// Source entry.
        path_src: PathBuf,
        /// Destination entry.
        path_dst: PathBuf,
        /// Underlying IO error, unchanged.
        #[source]
        source: io::Error,
    },
    /// A source directory resolves to a directory already being copied.
    #[error(
        "Directory cycle detected: {} resolves to ancestor {}",
        .path.display(),
        .path_ancestor.display()
    )]
    Cycle {
        /// Entry that loops back.
        path: PathBuf,
        /// Ancestor it resolves to.
        path_ancestor: PathBuf,
    },
}

impl CopyTreeError {
    /// Classify the failure.
    pub fn kind(&self) -> EnumCopyErrorKind {
        match self {
            Self::Dir { source, .. } | Self::File { source, .. } => source.kind().into(),
            Self::Cycle { .. } => EnumCopyErrorKind::Cycle,
        }
    }

    /// Underlying IO error, if the failure came from a filesystem primitive.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Dir { source, .. } | Self::File { source, .. } => Some(source),
            Self::Cycle { .. } => None,
        }
    }

    /// Step that failed, if any.
    pub fn stage(&self) -> Option<EnumCopyStage> {
        match self {
            Self::Dir { stage, .. } | Self::File { stage, .. } => Some(*stage),
            Self::Cycle { .. } => None,
        }
    }

    /// Path the failure is attributed to (destination side for file copies).
    pub fn path(&self) -> &Path {
        match self {
            Self::Dir { path, .. } | Self::Cycle { path, .. } => path,
            Self::File { path_dst, .. } => path_dst,
        }
    }
}

impl From<CopyTreeError> for io::Error {
    fn from(exception: CopyTreeError) -> Self {
        let kind = match exception.io_error() {
            Some(e) => e.kind(),
            None => io::ErrorKind::Other,
        };
        io::Error::new(kind, exception)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
