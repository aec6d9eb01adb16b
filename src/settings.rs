//! Module settings, configurable using environment variables.
use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::permissions::PermissionPolicy;

/// How finished results are handed to the routing platform.
///
/// Selects the whole behavior bundle of a delivery flavor, not just the
/// final artifact; see the field docs on [OxibidsEnvOptions].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Move the BIDS directory into the output folder as-is. Source DICOM
    /// files are staged by moving them into `sourcedata/`.
    #[default]
    Move,
    /// Zip the BIDS directory and drop a `.dcm` trigger file next to it so
    /// the platform notices the result. Source DICOM files are staged by
    /// copying, with queue-prefixed names (`prefix#name.dcm`) rewritten.
    Archive,
}

impl DeliveryMode {
    /// Default for the `source_data` module setting.
    pub(crate) fn default_source_data(self) -> &'static str {
        match self {
            DeliveryMode::Move => "True",
            DeliveryMode::Archive => "False",
        }
    }

    /// Whether the scaffold tool overwrites an existing skeleton.
    pub(crate) fn forces_scaffold(self) -> bool {
        matches!(self, DeliveryMode::Archive)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OxibidsEnvOptions {
    /// Delivery flavor, `OXIBIDS_DELIVERY`.
    #[serde(default)]
    pub delivery: DeliveryMode,
    /// Permission policy applied to the result tree, `OXIBIDS_PERMISSIONS`.
    /// Unset means the delivery mode's default: `owner` for [DeliveryMode::Move],
    /// `world` for [DeliveryMode::Archive].
    #[serde(default)]
    pub permissions: Option<PermissionPolicy>,
    /// Where per-job scratch directories are created, `OXIBIDS_WORK_ROOT`.
    #[serde(default = "default_work_root")]
    pub work_root: Utf8PathBuf,
    /// Converter executable, `OXIBIDS_DCM2BIDS_EXE`.
    #[serde(default = "default_dcm2bids_exe")]
    pub dcm2bids_exe: String,
    /// Scaffold executable, `OXIBIDS_SCAFFOLD_EXE`.
    #[serde(default = "default_scaffold_exe")]
    pub scaffold_exe: String,
}

impl OxibidsEnvOptions {
    /// Extract options from `OXIBIDS_*` environment variables.
    pub fn from_env() -> Result<Self, figment::Error> {
        crate::config::get_config().extract()
    }

    /// The effective permission policy for this run.
    pub fn permission_policy(&self) -> PermissionPolicy {
        self.permissions.unwrap_or(match self.delivery {
            DeliveryMode::Move => PermissionPolicy::Owner,
            DeliveryMode::Archive => PermissionPolicy::World,
        })
    }
}

fn default_work_root() -> Utf8PathBuf {
    Utf8PathBuf::from(".")
}

fn default_dcm2bids_exe() -> String {
    "dcm2bids".to_string()
}

fn default_scaffold_exe() -> String {
    "dcm2bids_scaffold".to_string()
}

#[cfg(test)]
mod tests {
    use figment::Figment;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{DeliveryMode, OxibidsEnvOptions};
    use crate::permissions::PermissionPolicy;

    #[test]
    fn unconfigured_options_use_defaults() {
        let options: OxibidsEnvOptions = Figment::new().extract().unwrap();
        assert_eq!(options.delivery, DeliveryMode::Move);
        assert_eq!(options.permissions, None);
        assert_eq!(options.work_root, ".");
        assert_eq!(options.dcm2bids_exe, "dcm2bids");
        assert_eq!(options.scaffold_exe, "dcm2bids_scaffold");
    }

    #[rstest]
    #[case(DeliveryMode::Move, PermissionPolicy::Owner)]
    #[case(DeliveryMode::Archive, PermissionPolicy::World)]
    fn policy_defaults_follow_delivery_mode(
        #[case] delivery: DeliveryMode,
        #[case] expected: PermissionPolicy,
    ) {
        let mut options: OxibidsEnvOptions = Figment::new().extract().unwrap();
        options.delivery = delivery;
        assert_eq!(options.permission_policy(), expected);
        options.permissions = Some(PermissionPolicy::Group);
        assert_eq!(options.permission_policy(), PermissionPolicy::Group);
    }

    #[rstest]
    #[case("\"move\"", DeliveryMode::Move)]
    #[case("\"archive\"", DeliveryMode::Archive)]
    fn delivery_mode_names(#[case] given: &str, #[case] expected: DeliveryMode) {
        let actual: DeliveryMode = serde_json::from_str(given).unwrap();
        assert_eq!(actual, expected)
    }
}
