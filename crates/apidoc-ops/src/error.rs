use std::io;
use std::path::PathBuf;

use apidoc_schema::SchemaError;
use thiserror::Error;

/// Process exit codes shared by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Findings = 1,
    Config = 2,
    InvalidInput = 3,
    Io = 4,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no item named '{name}'{}", suggestion_hint(.suggestion))]
    ItemNotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("{0}")]
    InvalidInput(String),
}

impl OperationError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Schema(SchemaError::Io { .. } | SchemaError::Walk { .. }) => ExitCode::Io,
            Self::Schema(_) => ExitCode::InvalidInput,
            Self::Io { .. } => ExitCode::Io,
            Self::ItemNotFound { .. } => ExitCode::Findings,
            Self::InvalidInput(_) => ExitCode::InvalidInput,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|name| format!(" (did you mean '{name}'?)"))
        .unwrap_or_default()
}

pub type OperationResult<T> = Result<T, OperationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_includes_suggestion() {
        let err = OperationError::ItemNotFound {
            name: "Mesage".into(),
            suggestion: Some("Message".into()),
        };
        assert_eq!(
            err.to_string(),
            "no item named 'Mesage' (did you mean 'Message'?)"
        );
        assert_eq!(err.exit_code(), ExitCode::Findings);

        let err = OperationError::ItemNotFound {
            name: "Zzz".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "no item named 'Zzz'");
    }

    #[test]
    fn io_errors_map_to_io_exit_code() {
        let err = OperationError::io("page.md", io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(err.exit_code().code(), 4);
    }
}
