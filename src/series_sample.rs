//! Sampling identifying headers from the incoming DICOM series.
#![allow(non_snake_case)]

use camino::{Utf8Path, Utf8PathBuf};
use dicom::dictionary_std::tags;
use dicom::object::{DefaultDicomObject, Tag};

use crate::error::JobError;
use crate::sanitize::{sanitize, sanitize_label};
use crate::settings::DeliveryMode;
use crate::types::ParticipantLabel;

/// File extension the routing platform uses for DICOM instances.
pub const DICOM_EXTENSION: &str = "dcm";

/// Participant label used when no file in the series carries a PatientID.
pub const FALLBACK_PATIENT_ID: &str = "ID0000001";

/// Identifying header fields sampled from the incoming series.
///
/// Each field holds the first non-empty value seen while scanning the input
/// folder in sorted filename order; empty means no file carried the tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesSample {
    pub PatientID: String,
    pub AccessionNumber: String,
    pub StudyDate: String,
    pub StudyTime: String,
}

impl SeriesSample {
    /// Scan the input folder's `.dcm` files and sample identifying headers.
    ///
    /// Files are visited in sorted filename order, so the derived identity
    /// does not depend on directory iteration order. Scanning stops once
    /// every field is captured. A file that fails to parse as DICOM is an
    /// error.
    pub fn from_folder(input_folder: &Utf8Path) -> Result<Self, JobError> {
        let mut sample = Self::default();
        for path in dicom_files(input_folder)? {
            let dcm = dicom::object::open_file(path.as_std_path())?;
            sample.absorb(&dcm);
            if sample.is_complete() {
                break;
            }
        }
        Ok(sample)
    }

    /// Capture the first non-empty value for each field.
    fn absorb(&mut self, dcm: &DefaultDicomObject) {
        absorb_tag(&mut self.PatientID, dcm, tags::PATIENT_ID);
        absorb_tag(&mut self.AccessionNumber, dcm, tags::ACCESSION_NUMBER);
        absorb_tag(&mut self.StudyDate, dcm, tags::STUDY_DATE);
        absorb_tag(&mut self.StudyTime, dcm, tags::STUDY_TIME);
    }

    fn is_complete(&self) -> bool {
        !(self.PatientID.is_empty()
            || self.AccessionNumber.is_empty()
            || self.StudyDate.is_empty()
            || self.StudyTime.is_empty())
    }

    /// The BIDS participant label: PatientID reduced to label-legal
    /// characters, or the fixed placeholder when none was found.
    pub fn participant_label(&self) -> ParticipantLabel {
        let label = sanitize_label(&self.PatientID);
        if label.is_empty() {
            ParticipantLabel::from_static(FALLBACK_PATIENT_ID)
        } else {
            ParticipantLabel::from(label)
        }
    }

    /// Name of the result directory for this job.
    ///
    /// Always contains the accession number when one was read; archive
    /// delivery appends study date and time so repeated studies of the same
    /// accession stay distinct.
    pub fn result_dir_name(&self, mode: DeliveryMode) -> String {
        let participant = self.participant_label();
        let accession = sanitize(&self.AccessionNumber);
        match mode {
            DeliveryMode::Move => format!("BIDS_{participant}_{accession}"),
            DeliveryMode::Archive => format!(
                "BIDS_{participant}_{accession}_{}{}",
                sanitize(&self.StudyDate),
                sanitize(&self.StudyTime),
            ),
        }
    }
}

/// The `.dcm` files directly inside `folder`, sorted by filename.
pub(crate) fn dicom_files(folder: &Utf8Path) -> std::io::Result<Vec<Utf8PathBuf>> {
    let mut files: Vec<Utf8PathBuf> = fs_err::read_dir(folder.as_std_path())?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.path()).ok())
        .filter(|path| path.extension() == Some(DICOM_EXTENSION) && path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Keep the first non-empty value seen for a field.
fn absorb_tag(field: &mut String, dcm: &DefaultDicomObject, tag: Tag) {
    if !field.is_empty() {
        return;
    }
    if let Some(value) = tag_str(dcm, tag) {
        *field = value;
    }
}

/// The trimmed string value of a tag, if present and non-empty.
fn tag_str(dcm: &DefaultDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|e| e.string().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{SeriesSample, FALLBACK_PATIENT_ID};
    use crate::settings::DeliveryMode;

    fn sample() -> SeriesSample {
        SeriesSample {
            PatientID: "PAT01".to_string(),
            AccessionNumber: "ACC123".to_string(),
            StudyDate: "20240101".to_string(),
            StudyTime: "120000".to_string(),
        }
    }

    #[rstest]
    #[case(DeliveryMode::Move, "BIDS_PAT01_ACC123")]
    #[case(DeliveryMode::Archive, "BIDS_PAT01_ACC123_20240101120000")]
    fn result_dir_name_per_mode(#[case] mode: DeliveryMode, #[case] expected: &str) {
        assert_eq!(sample().result_dir_name(mode), expected)
    }

    #[test]
    fn empty_sample_falls_back_to_placeholder() {
        let sample = SeriesSample::default();
        assert_eq!(sample.participant_label().as_str(), FALLBACK_PATIENT_ID);
        assert_eq!(
            sample.result_dir_name(DeliveryMode::Move),
            format!("BIDS_{FALLBACK_PATIENT_ID}_")
        );
    }

    #[test]
    fn label_strips_non_bids_characters() {
        let sample = SeriesSample {
            PatientID: "AB-12^3".to_string(),
            ..sample()
        };
        assert_eq!(sample.participant_label().as_str(), "AB123");
    }
}
