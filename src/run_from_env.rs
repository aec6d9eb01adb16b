use camino::Utf8Path;

use crate::converter::Dcm2BidsCli;
use crate::job::run_job;
use crate::settings::OxibidsEnvOptions;

/// Runs one conversion job using configuration from `OXIBIDS_*` environment
/// variables and the real dcm2bids tools.
pub fn run_from_env(input_folder: &Utf8Path, output_folder: &Utf8Path) -> anyhow::Result<()> {
    let options = OxibidsEnvOptions::from_env()?;
    let converter = Dcm2BidsCli::new(&options);
    run_job(&options, &converter, input_folder, output_folder)?;
    Ok(())
}
