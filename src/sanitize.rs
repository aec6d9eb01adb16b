use regex::Regex;
use std::sync::OnceLock;

/// Replace characters that are unsafe in result path components with "_".
///
/// DICOM string values are not trustworthy. It's also necessary to handle
/// NUL bytes.
pub(crate) fn sanitize<S: AsRef<str>>(s: S) -> String {
    let s_nonull = s.as_ref().replace('\0', "");
    PATH_CHARS_RE
        .get_or_init(|| Regex::new(r#"[^A-Za-z0-9\.\-]+"#).unwrap())
        .replace_all(&s_nonull, "_")
        .to_string()
}

/// Reduce a value to a BIDS-legal label: ASCII letters and digits only.
pub(crate) fn sanitize_label<S: AsRef<str>>(s: S) -> String {
    s.as_ref()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

static PATH_CHARS_RE: OnceLock<Regex> = OnceLock::new();

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{sanitize, sanitize_label};

    #[rstest]
    #[case("ACC123", "ACC123")]
    #[case("t1 mprage/sag", "t1_mprage_sag")]
    #[case("nul\0byte", "nulbyte")]
    #[case("1.3.12-46", "1.3.12-46")]
    fn test_sanitize(#[case] given: &str, #[case] expected: &str) {
        assert_eq!(sanitize(given), expected)
    }

    #[rstest]
    #[case("ABC123", "ABC123")]
    #[case("AB-12^3", "AB123")]
    #[case("", "")]
    fn test_sanitize_label(#[case] given: &str, #[case] expected: &str) {
        assert_eq!(sanitize_label(given), expected)
    }
}
