use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::js_protocol::runtime::{
    AddBindingParams, EvaluateParams, EventBindingCalled,
};
use chromiumoxide::Page;
use desmos_contracts::{
    CALCULATOR_URL, DEFAULT_READY_TIMEOUT_MS, ENV_CHROME_EXECUTABLE_PATH, OBSERVER_BINDING,
};
use desmos_state::VariableNames;
use futures_util::stream::BoxStream;
use futures_util::StreamExt as _;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::bridge::{await_halt, parse_observation, Observation};
use crate::error::SandboxError;
use crate::script::{observer_script, ready_check_script, set_state_script};

const READY_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Chrome binary; `None` lets chromiumoxide find one.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub calculator_url: String,
    /// Bound on navigation plus the wait for `window.Calc`.
    pub ready_timeout: Duration,
    pub browser_args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        LaunchOptions {
            executable: None,
            headless: true,
            calculator_url: CALCULATOR_URL.to_string(),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            browser_args: Vec::new(),
        }
    }
}

impl LaunchOptions {
    /// Defaults, with the executable taken from `CHROME_EXECUTABLE_PATH` when set.
    pub fn from_env() -> Self {
        let executable = std::env::var_os(ENV_CHROME_EXECUTABLE_PATH)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        LaunchOptions {
            executable,
            ..LaunchOptions::default()
        }
    }
}

/// One browser with one calculator page, used for a single run.
pub struct Sandbox {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl Sandbox {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, SandboxError> {
        let mut builder = BrowserConfig::builder();
        if let Some(exe) = &options.executable {
            builder = builder.chrome_executable(exe);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.browser_args.is_empty() {
            builder = builder.args(options.browser_args.iter().cloned());
        }
        let config = builder
            .build()
            .map_err(|e| SandboxError::launch("browser config", e))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SandboxError::launch("start browser", e))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!(error = %err, "browser handler error");
                }
            }
        });
        tracing::info!(
            executable = ?options.executable,
            headless = options.headless,
            "browser started"
        );

        match open_calculator(&browser, options).await {
            Ok(page) => Ok(Sandbox {
                browser,
                handler,
                page,
            }),
            Err(err) => {
                shutdown(&mut browser, handler).await;
                Err(err)
            }
        }
    }

    /// Attaches the running-flag and output-list observers and returns the
    /// stream of their notifications. The event subscription exists before
    /// the observers do, so no notification can be lost.
    pub async fn observe(
        &self,
        vars: &VariableNames,
    ) -> Result<BoxStream<'static, Observation>, SandboxError> {
        self.page
            .execute(AddBindingParams::new(OBSERVER_BINDING))
            .await
            .map_err(|e| SandboxError::evaluation("add observer binding", e))?;
        let events = self
            .page
            .event_listener::<EventBindingCalled>()
            .await
            .map_err(|e| SandboxError::evaluation("subscribe to observer binding", e))?;

        let observations = events
            .filter_map(|event| {
                let observation = if event.name == OBSERVER_BINDING {
                    match parse_observation(&event.payload) {
                        Ok(observation) => Some(observation),
                        Err(err) => {
                            tracing::warn!(
                                error = %err,
                                payload_len = event.payload.len(),
                                "dropping malformed observer payload"
                            );
                            None
                        }
                    }
                } else {
                    None
                };
                futures_util::future::ready(observation)
            })
            .boxed();

        let _: bool = evaluate(&self.page, observer_script(vars))
            .await
            .map_err(|e| SandboxError::evaluation("install observers", e))?;
        tracing::debug!(running = %vars.running, stdout = %vars.stdout, "observers attached");
        Ok(observations)
    }

    /// Replaces the calculator state. A playing ticker starts evaluating
    /// immediately.
    pub async fn load_state(&self, state: &Value) -> Result<(), SandboxError> {
        let _: bool = evaluate(&self.page, set_state_script(state))
            .await
            .map_err(|e| SandboxError::evaluation("set calculator state", e))?;
        tracing::debug!("calculator state loaded");
        Ok(())
    }

    /// Observers first, then the state, then the single wait for halt.
    pub async fn run(
        &self,
        state: &Value,
        vars: &VariableNames,
        timeout: Option<Duration>,
    ) -> Result<Option<Vec<f64>>, SandboxError> {
        let observations = self.observe(vars).await?;
        self.load_state(state).await?;

        let halt = await_halt(observations);
        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, halt)
                .await
                .map_err(|_| SandboxError::TimedOut(limit))??,
            None => halt.await?,
        };
        tracing::info!(
            output_len = output.as_ref().map_or(0, Vec::len),
            "program halted"
        );
        Ok(output)
    }

    pub async fn close(self) {
        let Sandbox {
            mut browser,
            handler,
            page: _,
        } = self;
        shutdown(&mut browser, handler).await;
    }
}

async fn open_calculator(browser: &Browser, options: &LaunchOptions) -> Result<Page, SandboxError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| SandboxError::launch("open page", e))?;

    let ready = async {
        page.goto(NavigateParams::new(options.calculator_url.clone()))
            .await
            .map_err(|e| SandboxError::launch("navigate to calculator", e))?;
        loop {
            let ready: bool = evaluate(&page, ready_check_script())
                .await
                .map_err(|e| SandboxError::launch("check calculator readiness", e))?;
            if ready {
                return Ok::<(), SandboxError>(());
            }
            tokio::time::sleep(READY_POLL).await;
        }
    };
    match tokio::time::timeout(options.ready_timeout, ready).await {
        Ok(res) => res?,
        Err(_) => {
            return Err(SandboxError::LaunchFailed(format!(
                "calculator at {} not ready within {} ms",
                options.calculator_url,
                options.ready_timeout.as_millis()
            )))
        }
    }
    tracing::info!(url = %options.calculator_url, "calculator ready");
    Ok(page)
}

async fn evaluate<T: DeserializeOwned>(
    page: &Page,
    expression: impl Into<String>,
) -> Result<T, String> {
    let params = EvaluateParams::builder()
        .expression(expression)
        .return_by_value(true)
        .build()?;
    let result = page
        .evaluate_expression(params)
        .await
        .map_err(|e| e.to_string())?;
    result.into_value().map_err(|e| e.to_string())
}

async fn shutdown(browser: &mut Browser, handler: JoinHandle<()>) {
    if let Err(err) = browser.close().await {
        tracing::warn!(error = %err, "close browser; killing it");
        if let Some(Err(err)) = browser.kill().await {
            tracing::warn!(error = %err, "kill browser");
        }
    }
    if let Err(err) = browser.wait().await {
        tracing::warn!(error = %err, "wait for browser exit");
    }
    handler.abort();
    tracing::debug!("browser torn down");
}
