use std::collections::BTreeMap;
use std::path::PathBuf;

use pyo3::exceptions::{PyFileNotFoundError, PyOSError, PyPermissionError};
use pyo3::prelude::*;
use treecopy_io_fs::{
    CopyTreeError, EnumCopyErrorKind, ReportCopy, SpecCopyOptions, copy_tree_with_options,
};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "treecopy.fs.copy_tree.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "ReportCopy")]
#[derive(Debug, Clone)]
struct PyReportCopy {
    inner: ReportCopy,
}

impl From<ReportCopy> for PyReportCopy {
    fn from(report_copy: ReportCopy) -> Self {
        Self { inner: report_copy }
    }
}

#[pymethods]
impl PyReportCopy {
    #[getter]
    fn cnt_dirs_created(&self) -> u64 {
        self.inner.cnt_dirs_created
    }

    #[getter]
    fn cnt_dirs_merged(&self) -> u64 {
        self.inner.cnt_dirs_merged
    }

    #[getter]
    fn cnt_files_copied(&self) -> u64 {
        self.inner.cnt_files_copied
    }

    #[getter]
    fn cnt_bytes_copied(&self) -> u64 {
        self.inner.cnt_bytes_copied
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.inner.to_dict()
    }

    #[pyo3(signature = (prefix = "[COPY]"))]
    fn format(&self, prefix: &str) -> String {
        self.inner.format(prefix)
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

fn map_copy_tree_error(exception: CopyTreeError) -> PyErr {
    let message = exception.to_string();
    match exception.kind() {
        EnumCopyErrorKind::NotFound => PyFileNotFoundError::new_err(message),
        EnumCopyErrorKind::PermissionDenied => PyPermissionError::new_err(message),
        EnumCopyErrorKind::Cycle | EnumCopyErrorKind::Io => PyOSError::new_err(message),
    }
}

#[pyfunction(name = "copy_tree")]
#[pyo3(signature = (
    dir_source,
    dir_destination,
    if_preserve_times = true,
    if_preserve_xattrs = true
))]
fn copy_tree_py(
    py: Python<'_>,
    dir_source: PathBuf,
    dir_destination: PathBuf,
    if_preserve_times: bool,
    if_preserve_xattrs: bool,
) -> PyResult<PyReportCopy> {
    let spec_cp_options = SpecCopyOptions {
        if_preserve_times,
        if_preserve_xattrs,
    };

    let report_copy = py.allow_threads(|| {
        copy_tree_with_options(&dir_source, &dir_destination, &spec_cp_options)
    });
    let report_copy = report_copy.map_err(map_copy_tree_error)?;
    Ok(PyReportCopy::from(report_copy))
}

#[pymodule]
fn _treecopy_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportCopy>()?;
    module.add_function(wrap_pyfunction!(copy_tree_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
