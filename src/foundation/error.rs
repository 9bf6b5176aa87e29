pub type HandvizResult<T> = Result<T, HandvizError>;

#[derive(thiserror::Error, Debug)]
pub enum HandvizError {
    #[error("host not installed: {0}")]
    HostNotFound(String),

    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("unsupported output format: {0}")]
    UnsupportedOutput(String),

    #[error("empty gesture data: {0}")]
    EmptyGesture(String),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("host process error: {0}")]
    Host(String),

    #[error("image post-processing error: {0}")]
    PostProcess(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandvizError {
    pub fn host_not_found(msg: impl Into<String>) -> Self {
        Self::HostNotFound(msg.into())
    }

    pub fn unsupported_input(msg: impl Into<String>) -> Self {
        Self::UnsupportedInput(msg.into())
    }

    pub fn unsupported_output(msg: impl Into<String>) -> Self {
        Self::UnsupportedOutput(msg.into())
    }

    pub fn empty_gesture(msg: impl Into<String>) -> Self {
        Self::EmptyGesture(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    pub fn post_process(msg: impl Into<String>) -> Self {
        Self::PostProcess(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{ExportFormat, Hand};

    #[test]
    fn parse_failures_carry_their_category_prefix() {
        let cases: [(HandvizError, &str); 4] = [
            ("fbx".parse::<ExportFormat>().unwrap_err(), "unsupported output format:"),
            ("Both".parse::<Hand>().unwrap_err(), "malformed input:"),
            (crate::gesture::parse_gesture_json("[]").unwrap_err(), "empty gesture data:"),
            (
                crate::wach::read_wach_file(std::path::Path::new("a.csv")).unwrap_err(),
                "unsupported input:",
            ),
        ];
        for (err, prefix) in cases {
            assert!(err.to_string().starts_with(prefix), "{err}");
        }
    }

    #[test]
    fn io_context_survives_in_other() {
        let missing = std::path::Path::new("target/error_tests/missing.txt");
        let err = crate::wach::read_wach_file(missing).unwrap_err();
        let HandvizError::Other(inner) = &err else {
            panic!("expected Other, got {err}");
        };
        assert!(err.to_string().contains("read WACH file"), "{err}");
        let io = inner.root_cause().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }
}
