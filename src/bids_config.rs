//! The configuration document handed to the converter.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::error::JobError;
use crate::task::Description;

/// Fixed name of the emitted converter configuration file.
pub const CONFIG_FILE_NAME: &str = "dcm2bids_config.json";

#[derive(Serialize)]
struct ConverterConfig<'a> {
    descriptions: &'a [Description],
}

/// Write the converter configuration into `dir` and return its path.
///
/// The document has a single `descriptions` key mirroring the resolved
/// settings, pretty-printed.
pub fn write_config(dir: &Utf8Path, descriptions: &[Description]) -> Result<Utf8PathBuf, JobError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let doc = serde_json::to_vec_pretty(&ConverterConfig { descriptions })?;
    fs_err::write(path.as_std_path(), doc)?;
    Ok(path)
}
