use camino::Utf8PathBuf;

/// Error reading or parsing the task descriptor file.
#[derive(thiserror::Error, Debug)]
pub enum TaskFileError {
    #[error("Task file {path} not found or unreadable")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Task file {path} is not valid JSON")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// Failure to run one of the external conversion tools.
#[derive(thiserror::Error, Debug)]
pub enum ConverterError {
    #[error("could not run {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} failed (exit code {code:?}): {stderr}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Anything that can go wrong while running a conversion job.
///
/// [JobError::MissingFolders] and [JobError::TaskFile] are the guarded,
/// user-reported failure paths. The rest surface from whichever operation
/// failed; there is no retry and no partial-result cleanup.
#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("IN/OUT paths do not exist")]
    MissingFolders,

    #[error(transparent)]
    TaskFile(#[from] TaskFileError),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Dicom(#[from] dicom::object::ReadError),

    #[error(transparent)]
    Converter(#[from] ConverterError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
