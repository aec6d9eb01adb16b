use aliri_braid::braid;

/// BIDS participant label, passed to the converter as `-p`.
///
/// Derived from `PatientID`, reduced to the characters BIDS permits in a
/// label (ASCII letters and digits).
#[braid(serde)]
pub struct ParticipantLabel;
