//! Identifiers shared between the graph compiler and the runner.
//!
//! The compiler bakes the reserved variable names into the expressions it
//! emits; the runner must use the same names to inject input and to observe
//! the halt flag and output list. Changing any of these is a breaking change
//! for previously compiled documents.

/// Variable holding the input byte list (`s_{tdin}=\left[...\right]`).
pub const STDIN_VARIABLE: &str = "s_{tdin}";
/// Variable the program appends output byte values to.
pub const STDOUT_VARIABLE: &str = "s_{tdout}";
/// Variable that stays non-zero while the program runs.
pub const RUNNING_VARIABLE: &str = "r";

pub const LIST_OPEN: &str = "\\left[";
pub const LIST_CLOSE: &str = "\\right]";

/// Graph paper and zoom buttons are disabled; nothing is rendered headless.
pub const CALCULATOR_URL: &str = "https://www.desmos.com/calculator?nographpaper&nozoomButtons";

pub const ENV_CHROME_EXECUTABLE_PATH: &str = "CHROME_EXECUTABLE_PATH";
pub const ENV_RUNNER_LOG: &str = "DESMOS_RUNNER_LOG";

pub const DEFAULT_READY_TIMEOUT_MS: u64 = 30_000;

/// Name of the page binding observers report through.
pub const OBSERVER_BINDING: &str = "__desmosRunnerObserve";

/// Page global holding the latest output list between observer callbacks.
pub const OUTPUT_SNAPSHOT: &str = "__desmosRunnerStdout";
