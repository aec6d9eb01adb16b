//! The task descriptor the routing platform writes into the input folder.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TaskFileError;
use crate::settings::DeliveryMode;

/// Name of the task descriptor file in the input folder.
pub const TASK_FILE_NAME: &str = "task.json";

/// The parts of the task descriptor this module consumes.
///
/// The descriptor carries much more (routing rules, job metadata);
/// everything except `process.settings` is ignored here.
#[derive(Debug, Default, Deserialize)]
pub struct TaskDescriptor {
    #[serde(default)]
    process: Option<ProcessSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ProcessSection {
    #[serde(default)]
    settings: Option<SettingsPatch>,
}

/// Settings overrides from `process.settings`.
///
/// A key absent here keeps its built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub source_data: Option<String>,
    #[serde(default)]
    pub descriptions: Option<Vec<Description>>,
}

/// One dcm2bids matching rule.
///
/// `criteria` are glob matches against DICOM header fields. Any additional
/// keys (`custom_entities`, `sidecar_changes`, ...) are carried through to
/// the converter untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub datatype: String,
    pub suffix: String,
    #[serde(default)]
    pub criteria: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resolved module settings: built-in defaults overridden key-by-key by the
/// task descriptor. Values are replaced wholesale, never deep-merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSettings {
    pub source_data: String,
    pub descriptions: Vec<Description>,
}

impl TaskDescriptor {
    /// Read the task descriptor from [TASK_FILE_NAME] in the input folder.
    pub fn load(input_folder: &Utf8Path) -> Result<Self, TaskFileError> {
        let path = input_folder.join(TASK_FILE_NAME);
        let content = fs_err::read_to_string(path.as_std_path()).map_err(|source| {
            TaskFileError::Read {
                path: path.clone(),
                source,
            }
        })?;
        serde_json::from_str(&content).map_err(|source| TaskFileError::Parse { path, source })
    }

    /// The settings overrides carried by this descriptor, if any.
    pub fn settings(self) -> SettingsPatch {
        self.process.and_then(|p| p.settings).unwrap_or_default()
    }
}

impl ModuleSettings {
    /// Built-in defaults: a single rule matching a T1-weighted MPRAGE series.
    pub fn defaults(mode: DeliveryMode) -> Self {
        let mut criteria = Map::new();
        criteria.insert(
            "SeriesDescription".to_string(),
            Value::String("*mprage*".to_string()),
        );
        Self {
            source_data: mode.default_source_data().to_string(),
            descriptions: vec![Description {
                datatype: "anat".to_string(),
                suffix: "T1w".to_string(),
                criteria,
                extra: Map::new(),
            }],
        }
    }

    /// Shallow merge: a key present in the patch replaces the default.
    pub fn merged(mut self, patch: SettingsPatch) -> Self {
        if let Some(source_data) = patch.source_data {
            self.source_data = source_data;
        }
        if let Some(descriptions) = patch.descriptions {
            self.descriptions = descriptions;
        }
        self
    }

    /// Whether DICOM source files should be staged into `sourcedata/`.
    ///
    /// The setting is a stringly boolean for compatibility with existing
    /// task descriptors; only the exact string `"True"` enables staging.
    pub fn stage_source_data(&self) -> bool {
        self.source_data == "True"
    }
}
