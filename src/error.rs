use std::path::PathBuf;

/// Errors that abort a run.
///
/// Each variant maps to a process exit code so scripts driving `ozh` can tell
/// a bad config apart from an unreachable feed.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("source for {region} unavailable ({location}): {reason}")]
    SourceUnavailable {
        region: String,
        location: String,
        reason: String,
    },

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("report file '{}' could not be written: {reason}", path.display())]
    Output { path: PathBuf, reason: String },

    #[error("report file '{}' could not be read: {reason}", path.display())]
    Input { path: PathBuf, reason: String },
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn source_unavailable(region: &str, location: &str, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            region: region.to_string(),
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn output(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Output {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn input(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Precondition(_) => 3,
            AppError::SourceUnavailable { .. } => 4,
            AppError::Output { .. } => 5,
            AppError::Input { .. } => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let errors = [
            AppError::config("x"),
            AppError::Precondition("x".into()),
            AppError::source_unavailable("ZH", "zh.csv", "gone"),
            AppError::output("out.csv", "denied"),
            AppError::input("in.csv", "truncated"),
        ];
        let mut codes: Vec<u8> = errors.iter().map(AppError::exit_code).collect();
        codes.dedup();
        assert_eq!(codes, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn read_and_write_failures_are_told_apart() {
        let write = AppError::output("out.csv", "denied").to_string();
        let read = AppError::input("out.csv", "truncated").to_string();
        assert!(write.contains("could not be written"));
        assert!(read.contains("could not be read"));
    }

    #[test]
    fn source_unavailable_names_region_and_location() {
        let err = AppError::source_unavailable("BE", "https://example.org/be.csv", "HTTP 404");
        let text = err.to_string();
        assert!(text.contains("BE"));
        assert!(text.contains("https://example.org/be.csv"));
        assert!(text.contains("HTTP 404"));
    }
}
