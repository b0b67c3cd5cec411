use std::path::PathBuf;

#[derive(Debug)]
pub enum StateError {
    /// No document path or content was supplied.
    InvalidArgument(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    MalformedState(String),
    StdinPlaceholderNotFound {
        placeholder: String,
    },
    StdinPlaceholderAmbiguous {
        placeholder: String,
        count: usize,
    },
}

impl StateError {
    pub fn kind(&self) -> &'static str {
        match self {
            StateError::InvalidArgument(_) => "invalid-argument",
            StateError::Io { .. } => "io",
            StateError::MalformedState(_) => "malformed-state",
            StateError::StdinPlaceholderNotFound { .. } => "stdin-placeholder-not-found",
            StateError::StdinPlaceholderAmbiguous { .. } => "stdin-placeholder-ambiguous",
        }
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            StateError::Io { path, source } => {
                write!(f, "read state document {}: {source}", path.display())
            }
            StateError::MalformedState(msg) => write!(f, "malformed state: {msg}"),
            StateError::StdinPlaceholderNotFound { placeholder } => write!(
                f,
                "unable to find stdin placeholder {placeholder:?}\n\nfix:\n  - check that the stdin variable name matches the one the compiler emitted (--stdin-var)"
            ),
            StateError::StdinPlaceholderAmbiguous { placeholder, count } => write!(
                f,
                "stdin placeholder {placeholder:?} appears {count} times (expected exactly one)"
            ),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
