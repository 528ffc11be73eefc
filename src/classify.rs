use std::sync::OnceLock;

use regex::Regex;

static RUN_DIR_RE: OnceLock<Regex> = OnceLock::new();

/// Check whether a directory name follows the run-naming convention:
/// `yyyymmdd-KSnn` — eight digits, the literal `-KS` marker, then a
/// two-digit sequence number.
///
/// The match is anchored at the start only; trailing characters are
/// tolerated, matching the historical convention. Takes the bare directory
/// name, not a path.
pub fn is_run_dir_name(name: &str) -> bool {
    let re = RUN_DIR_RE
        .get_or_init(|| Regex::new(r"^[0-9]{8}-KS[0-9]{2}").expect("run dir regex is valid"));
    re.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_run_name() {
        assert!(is_run_dir_name("20230401-KS07"));
    }

    #[test]
    fn rejects_single_digit_sequence_number() {
        assert!(!is_run_dir_name("20230401-KS7"));
    }

    #[test]
    fn rejects_seven_digit_date() {
        assert!(!is_run_dir_name("2023040-KS07"));
    }

    #[test]
    fn rejects_unrelated_name() {
        assert!(!is_run_dir_name("random-dir"));
    }

    #[test]
    fn match_is_start_anchored_only() {
        // Trailing characters do not reject, a leading prefix does.
        assert!(is_run_dir_name("20230401-KS07-rerun"));
        assert!(!is_run_dir_name("x20230401-KS07"));
    }

    #[test]
    fn rejects_lowercase_marker() {
        assert!(!is_run_dir_name("20230401-ks07"));
    }
}
