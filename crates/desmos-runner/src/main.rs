use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use desmos_contracts::{
    CALCULATOR_URL, DEFAULT_READY_TIMEOUT_MS, ENV_RUNNER_LOG, RUNNING_VARIABLE, STDIN_VARIABLE,
    STDOUT_VARIABLE,
};
use desmos_runner::{read_input, run_program_blocking, write_output, RunnerConfig};
use desmos_sandbox::LaunchOptions;
use desmos_state::{StateError, VariableNames};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: desmos-runner [OPTIONS] <STATE> < input";

#[derive(Parser)]
#[command(name = "desmos-runner")]
#[command(
    about = "Runs a compiled calculator state headless, feeding stdin to the program and printing its output bytes.",
    long_about = None
)]
struct Cli {
    /// Calculator state document (JSON) produced by the compiler.
    #[arg(value_name = "STATE")]
    state: Option<PathBuf>,

    /// Read input bytes from a file instead of standard input.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Chrome executable. Defaults to $CHROME_EXECUTABLE_PATH, then discovery.
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    #[arg(long)]
    headful: bool,

    #[arg(long = "browser-arg", value_name = "ARG", allow_hyphen_values = true)]
    browser_args: Vec<String>,

    #[arg(long, default_value = CALCULATOR_URL)]
    calculator_url: String,

    #[arg(long, value_name = "MS", default_value_t = DEFAULT_READY_TIMEOUT_MS)]
    ready_timeout_ms: u64,

    /// Give up if the program has not halted after this long. Unset waits forever.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    #[arg(long, default_value = STDIN_VARIABLE)]
    stdin_var: String,

    #[arg(long, default_value = STDOUT_VARIABLE)]
    stdout_var: String,

    #[arg(long, default_value = RUNNING_VARIABLE)]
    running_var: String,

    /// Print the patched state document and exit without launching a browser.
    #[arg(long)]
    emit_state: bool,
}

impl Cli {
    fn config(&self) -> RunnerConfig {
        let mut launch = LaunchOptions::from_env();
        if let Some(chrome) = &self.chrome {
            launch.executable = Some(chrome.clone());
        }
        launch.headless = !self.headful;
        launch.browser_args = self.browser_args.clone();
        launch.calculator_url = self.calculator_url.clone();
        launch.ready_timeout = Duration::from_millis(self.ready_timeout_ms);

        RunnerConfig {
            vars: VariableNames {
                stdin: self.stdin_var.clone(),
                stdout: self.stdout_var.clone(),
                running: self.running_var.clone(),
            },
            launch,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                std::process::ExitCode::from(1)
            } else {
                std::process::ExitCode::SUCCESS
            };
        }
    };
    init_logging();

    match try_main(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "run failed");
            eprintln!("{err:#}");
            if matches!(
                err.downcast_ref::<StateError>(),
                Some(StateError::InvalidArgument(_))
            ) {
                eprintln!("\n{USAGE}");
            }
            std::process::ExitCode::from(1)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_RUNNER_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn try_main(cli: &Cli) -> Result<()> {
    let config = cli.config();

    // Validate the document before touching stdin.
    let state = desmos_state::load_state_file(cli.state.as_deref())?;
    let input = read_input(cli.input.as_deref())?;
    let patched = desmos_state::inject_input(&state, &config.vars, &input)?;
    tracing::info!(input_bytes = input.len(), "input injected");

    if cli.emit_state {
        let doc = patched.to_json_bytes()?;
        return write_output(std::io::stdout().lock(), &doc).context("write state");
    }

    let output = run_program_blocking(&patched, &config)?;
    write_output(std::io::stdout().lock(), &output).context("write stdout")
}
