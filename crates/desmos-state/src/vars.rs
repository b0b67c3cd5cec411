use desmos_contracts::{RUNNING_VARIABLE, STDIN_VARIABLE, STDOUT_VARIABLE};

/// Reserved variable names the compiler and the runner agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNames {
    pub stdin: String,
    pub stdout: String,
    pub running: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        VariableNames {
            stdin: STDIN_VARIABLE.to_string(),
            stdout: STDOUT_VARIABLE.to_string(),
            running: RUNNING_VARIABLE.to_string(),
        }
    }
}
