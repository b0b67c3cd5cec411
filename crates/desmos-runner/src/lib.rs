use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use desmos_sandbox::LaunchOptions;
use desmos_state::{decode_output_list, OutputError, ProgramState, VariableNames};

#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub vars: VariableNames,
    pub launch: LaunchOptions,
    /// `None` waits for as long as the program runs.
    pub timeout: Option<Duration>,
}

/// Reads the whole input stream up front; `None` reads standard input.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("read input: {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("read stdin")?;
            Ok(buf)
        }
    }
}

/// Output list snapshot at halt to raw bytes. An output list that was never
/// defined is an empty stream.
pub fn output_bytes(snapshot: Option<Vec<f64>>) -> Result<Vec<u8>, OutputError> {
    decode_output_list(&snapshot.unwrap_or_default())
}

/// Runs a patched document in a fresh sandbox and returns its output bytes.
pub async fn run_program(state: &ProgramState, config: &RunnerConfig) -> Result<Vec<u8>> {
    let snapshot =
        desmos_sandbox::execute(state, &config.vars, &config.launch, config.timeout).await?;
    let bytes = output_bytes(snapshot)?;
    tracing::debug!(output_bytes = bytes.len(), "decoded program output");
    Ok(bytes)
}

/// Drives [`run_program`] on a current-thread runtime.
pub fn run_program_blocking(state: &ProgramState, config: &RunnerConfig) -> Result<Vec<u8>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(run_program(state, config))
}

pub fn write_output<W: Write>(mut out: W, bytes: &[u8]) -> std::io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}
