//! Runs a patched calculator state inside a headless Chrome page and waits
//! for the program to clear its running flag.

mod bridge;
mod error;
mod launch;
mod script;

use std::time::Duration;

use desmos_state::{ProgramState, VariableNames};

pub use bridge::{await_halt, parse_observation, HaltLatch, Observation, ObserverSet, OutputCell};
pub use error::SandboxError;
pub use launch::{LaunchOptions, Sandbox};
pub use script::{observer_script, ready_check_script, set_state_script};

/// Launches a fresh sandbox, runs `state` to completion and tears the sandbox
/// down again, whether or not the run succeeded.
///
/// Returns the output list snapshot taken at halt (`None` if it was never
/// defined). With `timeout: None` this waits for as long as the program runs.
pub async fn execute(
    state: &ProgramState,
    vars: &VariableNames,
    options: &LaunchOptions,
    timeout: Option<Duration>,
) -> Result<Option<Vec<f64>>, SandboxError> {
    let sandbox = Sandbox::launch(options).await?;
    let result = sandbox.run(state.as_value(), vars, timeout).await;
    if let Err(err) = &result {
        tracing::debug!(error = ?err, "sandbox run failed");
    }
    sandbox.close().await;
    result
}
