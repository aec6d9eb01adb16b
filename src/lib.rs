mod bids_config;
mod config;
mod converter;
mod delivery;
mod error;
mod job;
mod permissions;
mod run_from_env;
mod sanitize;
mod series_sample;
mod settings;
mod task;
mod types;

pub use bids_config::{write_config, CONFIG_FILE_NAME};
pub use config::get_config;
pub use converter::{BidsConverter, Dcm2BidsCli};
pub use error::{ConverterError, JobError, TaskFileError};
pub use job::run_job;
pub use permissions::PermissionPolicy;
pub use run_from_env::run_from_env;
pub use series_sample::{SeriesSample, DICOM_EXTENSION, FALLBACK_PATIENT_ID};
pub use settings::{DeliveryMode, OxibidsEnvOptions};
pub use task::{Description, ModuleSettings, SettingsPatch, TaskDescriptor, TASK_FILE_NAME};
pub use types::ParticipantLabel;
