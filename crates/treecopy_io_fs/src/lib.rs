//! `treecopy_io_fs` v1:
//! Merge-aware recursive directory copy.
//!
//! Modules:
//! - `copy`   : traversal and copy orchestration
//! - `spec`   : options, stages and errors
//! - `report` : run-time report model
//! - `util`   : metadata and listing helpers

pub mod copy;
pub mod report;
pub mod spec;
mod util;

#[cfg(test)]
mod testing;

pub use copy::{copy_tree, copy_tree_with_options};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{CopyTreeError, EnumCopyErrorKind, EnumCopyStage, SpecCopyOptions};
