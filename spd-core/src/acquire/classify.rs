use std::path::PathBuf;

use spd_common::model::AttemptResult;

/// Verdict on one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Exit 0 and at least one output file.
    Success(Vec<PathBuf>),
    /// Exit 0 but nothing written. Known upstream failure mode; triggers reference extraction.
    SilentSuccess,
    /// Non-zero exit, whatever the directory holds.
    Failure,
}

pub fn classify(result: &AttemptResult) -> Classification {
    match (result.exit_code, result.produced_files.is_empty()) {
        (0, false) => Classification::Success(result.produced_files.clone()),
        (0, true) => Classification::SilentSuccess,
        _ => Classification::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, files: &[&str]) -> AttemptResult {
        AttemptResult {
            exit_code,
            combined_output: String::new(),
            produced_files: files.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn exit_zero_without_files_is_silent_success() {
        assert_eq!(classify(&result(0, &[])), Classification::SilentSuccess);
    }

    #[test]
    fn exit_zero_with_files_is_success() {
        assert_eq!(
            classify(&result(0, &["/out/a.mp3"])),
            Classification::Success(vec![PathBuf::from("/out/a.mp3")])
        );
    }

    #[test]
    fn non_zero_exit_is_failure_even_with_files() {
        assert_eq!(classify(&result(2, &["/out/a.mp3"])), Classification::Failure);
        assert_eq!(classify(&result(2, &[])), Classification::Failure);
        assert_eq!(classify(&result(-1, &[])), Classification::Failure);
    }
}
