//! One conversion job, end to end.

use camino::{Utf8Path, Utf8PathBuf};
use ulid::Ulid;

use crate::bids_config;
use crate::converter::BidsConverter;
use crate::delivery;
use crate::error::JobError;
use crate::permissions;
use crate::series_sample::{dicom_files, SeriesSample};
use crate::settings::{DeliveryMode, OxibidsEnvOptions};
use crate::task::{ModuleSettings, TaskDescriptor};

/// Name of the scratch subdirectory dcm2bids leaves inside the output tree.
const TMP_DCM2BIDS: &str = "tmp_dcm2bids";

/// Name of the scaffold subdirectory that receives staged source DICOMs.
const SOURCEDATA: &str = "sourcedata";

/// Run one conversion job: derive identity from the input series, scaffold
/// and fill a BIDS tree under a job-private working directory, and deliver
/// the result to the output folder.
pub fn run_job<C: BidsConverter>(
    options: &OxibidsEnvOptions,
    converter: &C,
    input_folder: &Utf8Path,
    output_folder: &Utf8Path,
) -> Result<(), JobError> {
    if !input_folder.is_dir() || !output_folder.is_dir() {
        return Err(JobError::MissingFolders);
    }
    tracing::info!(
        input = input_folder.as_str(),
        output = output_folder.as_str(),
        "starting dcm2bids conversion job"
    );

    let settings = ModuleSettings::defaults(options.delivery)
        .merged(TaskDescriptor::load(input_folder)?.settings());

    let sample = SeriesSample::from_folder(input_folder)?;
    let participant = sample.participant_label();
    tracing::info!(participant = participant.as_str(), "converting patient");

    let mode = options.delivery;
    let policy = options.permission_policy();

    // Job-private scratch tree: concurrent invocations sharing a work root
    // cannot collide on the config file or the result directory name.
    let work_dir = options.work_root.join(format!("oxibids-{}", Ulid::new()));
    let result_name = sample.result_dir_name(mode);
    let result_dir = work_dir.join(&result_name);
    fs_err::create_dir_all(result_dir.as_std_path())?;

    converter.scaffold(&result_dir, mode.forces_scaffold())?;
    permissions::apply_recursive(&result_dir, policy)?;

    let config_path = match mode {
        DeliveryMode::Move => bids_config::write_config(&work_dir, &settings.descriptions)?,
        DeliveryMode::Archive => {
            let path =
                bids_config::write_config(&result_dir.join("derivatives"), &settings.descriptions)?;
            permissions::apply_one(&path, policy)?;
            path
        }
    };
    tracing::info!(config = config_path.as_str(), "wrote converter configuration");

    let source_dir = stage_source_data(&settings, mode, input_folder, &result_dir)?
        .unwrap_or_else(|| input_folder.to_path_buf());

    converter.convert(&source_dir, &participant, &config_path, &result_dir)?;

    let tmp_dir = result_dir.join(TMP_DCM2BIDS);
    if tmp_dir.is_dir() {
        fs_err::remove_dir_all(tmp_dir.as_std_path())?;
    }

    permissions::apply_recursive(&result_dir, policy)?;

    let delivered = match mode {
        DeliveryMode::Move => delivery::move_into(&result_dir, output_folder)?,
        DeliveryMode::Archive => {
            let archive_path = work_dir.join(format!("{result_name}.zip"));
            delivery::zip_dir(&result_dir, &archive_path)?;
            let trigger = delivery::write_trigger(&work_dir, &result_name)?;
            let delivered_trigger = delivery::move_into(&trigger, output_folder)?;
            permissions::apply_one(&delivered_trigger, policy)?;
            let delivered_zip = delivery::move_into(&archive_path, output_folder)?;
            permissions::apply_one(&delivered_zip, policy)?;
            delivered_zip
        }
    };
    tracing::info!(delivered = delivered.as_str(), "job complete");

    // Results are out of the tree; drop the scratch directory.
    fs_err::remove_dir_all(work_dir.as_std_path())?;
    Ok(())
}

/// Relocate the input DICOM files into the scaffold's `sourcedata/`, if the
/// resolved settings ask for it and the scaffold provides the directory.
///
/// Returns the staged directory to use as the conversion source, or `None`
/// when the converter should read straight from the input folder.
fn stage_source_data(
    settings: &ModuleSettings,
    mode: DeliveryMode,
    input_folder: &Utf8Path,
    result_dir: &Utf8Path,
) -> Result<Option<Utf8PathBuf>, JobError> {
    if !settings.stage_source_data() {
        return Ok(None);
    }
    let source_dir = result_dir.join(SOURCEDATA);
    if !source_dir.is_dir() {
        return Ok(None);
    }
    for file in dicom_files(input_folder)? {
        match mode {
            DeliveryMode::Move => {
                delivery::move_into(&file, &source_dir)?;
            }
            DeliveryMode::Archive => {
                if let Some(name) = file.file_name() {
                    let dest = source_dir.join(rewritten_name(name));
                    fs_err::copy(file.as_std_path(), dest.as_std_path())?;
                }
            }
        }
    }
    tracing::info!(source = source_dir.as_str(), "staged source data");
    Ok(Some(source_dir))
}

/// Platform-received files may be named `<queue-prefix>#<name>`; keep
/// only the part after the last `#`.
fn rewritten_name(name: &str) -> &str {
    name.rsplit_once('#').map(|(_, suffix)| suffix).unwrap_or(name)
}
