use std::time::Duration;

#[derive(Debug)]
pub enum SandboxError {
    /// The browser could not be started or the calculator never became ready.
    LaunchFailed(String),
    /// Anything raised while driving the page after launch.
    Evaluation(String),
    /// The observer channel closed before the running flag reached zero.
    ObserversClosed,
    TimedOut(Duration),
}

impl SandboxError {
    pub fn kind(&self) -> &'static str {
        match self {
            SandboxError::LaunchFailed(_) => "sandbox-launch-failed",
            SandboxError::Evaluation(_) => "unhandled-evaluation-error",
            SandboxError::ObserversClosed => "observers-closed",
            SandboxError::TimedOut(_) => "timed-out",
        }
    }

    pub(crate) fn launch(what: &str, err: impl std::fmt::Display) -> Self {
        SandboxError::LaunchFailed(format!("{what}: {err}"))
    }

    pub(crate) fn evaluation(what: &str, err: impl std::fmt::Display) -> Self {
        SandboxError::Evaluation(format!("{what}: {err}"))
    }
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::LaunchFailed(msg) => write!(f, "sandbox launch failed: {msg}"),
            SandboxError::Evaluation(msg) => write!(f, "evaluation error: {msg}"),
            SandboxError::ObserversClosed => {
                f.write_str("page observers stopped before the program halted")
            }
            SandboxError::TimedOut(after) => {
                write!(f, "program did not halt within {} ms", after.as_millis())
            }
        }
    }
}

impl std::error::Error for SandboxError {}
