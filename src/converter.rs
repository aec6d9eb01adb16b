//! The external BIDS conversion tools.

use std::process::Command;

use camino::Utf8Path;

use crate::error::ConverterError;
use crate::settings::OxibidsEnvOptions;
use crate::types::ParticipantLabel;

/// The external capability that scaffolds and populates a BIDS tree.
///
/// The production implementation shells out to the dcm2bids suite; tests
/// substitute a fake so orchestration runs without the tools installed.
pub trait BidsConverter {
    /// Create the canonical BIDS skeleton inside `output_dir`.
    fn scaffold(&self, output_dir: &Utf8Path, force: bool) -> Result<(), ConverterError>;

    /// Convert the DICOM series under `source_dir` into `output_dir`.
    fn convert(
        &self,
        source_dir: &Utf8Path,
        participant: &ParticipantLabel,
        config_file: &Utf8Path,
        output_dir: &Utf8Path,
    ) -> Result<(), ConverterError>;
}

/// Runs `dcm2bids_scaffold` and `dcm2bids` as subprocesses.
#[derive(Debug, Clone)]
pub struct Dcm2BidsCli {
    scaffold_exe: String,
    dcm2bids_exe: String,
}

impl Dcm2BidsCli {
    pub fn new(options: &OxibidsEnvOptions) -> Self {
        Self {
            scaffold_exe: options.scaffold_exe.clone(),
            dcm2bids_exe: options.dcm2bids_exe.clone(),
        }
    }
}

impl BidsConverter for Dcm2BidsCli {
    fn scaffold(&self, output_dir: &Utf8Path, force: bool) -> Result<(), ConverterError> {
        let mut cmd = Command::new(&self.scaffold_exe);
        cmd.arg("-o").arg(output_dir);
        if force {
            cmd.arg("--force");
        }
        run_tool(&self.scaffold_exe, &mut cmd)
    }

    fn convert(
        &self,
        source_dir: &Utf8Path,
        participant: &ParticipantLabel,
        config_file: &Utf8Path,
        output_dir: &Utf8Path,
    ) -> Result<(), ConverterError> {
        let mut cmd = Command::new(&self.dcm2bids_exe);
        cmd.arg("-d")
            .arg(source_dir)
            .arg("-p")
            .arg(participant.as_str())
            .arg("-c")
            .arg(config_file)
            .arg("-o")
            .arg(output_dir)
            .arg("--auto_extract_entities");
        run_tool(&self.dcm2bids_exe, &mut cmd)
    }
}

/// Run a tool to completion, failing on spawn error or non-zero exit.
fn run_tool(tool: &str, cmd: &mut Command) -> Result<(), ConverterError> {
    tracing::info!(tool, "running {cmd:?}");
    let output = cmd.output().map_err(|source| ConverterError::Spawn {
        tool: tool.to_string(),
        source,
    })?;
    if !output.stdout.is_empty() {
        tracing::debug!(tool, "{}", String::from_utf8_lossy(&output.stdout));
    }
    if output.status.success() {
        Ok(())
    } else {
        Err(ConverterError::Failed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;

    use super::{BidsConverter, Dcm2BidsCli};
    use crate::error::ConverterError;
    use crate::settings::OxibidsEnvOptions;

    fn cli(scaffold_exe: &str) -> Dcm2BidsCli {
        let mut options: OxibidsEnvOptions = figment::Figment::new().extract().unwrap();
        options.scaffold_exe = scaffold_exe.to_string();
        Dcm2BidsCli::new(&options)
    }

    #[test]
    fn missing_executable_is_a_spawn_error() {
        let cli = cli("definitely-not-a-real-tool");
        let err = cli
            .scaffold(Utf8Path::new("/tmp/nowhere"), false)
            .unwrap_err();
        assert!(matches!(err, ConverterError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_a_failure_with_code() {
        let cli = cli("false");
        let err = cli
            .scaffold(Utf8Path::new("/tmp/nowhere"), false)
            .unwrap_err();
        match err {
            ConverterError::Failed { tool, code, .. } => {
                assert_eq!(tool, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
