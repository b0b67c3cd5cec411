use std::sync::{Arc, Mutex};

use futures_util::{Stream, StreamExt as _};
use serde::Deserialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::SandboxError;

/// One notification from the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Non-zero value of the running flag; `None` while it is undefined or NaN.
    Running(Option<f64>),
    /// The running flag reached zero. Carries the page-side output snapshot,
    /// read after every observer callback of that evaluation has run;
    /// `None` if the output list was never defined.
    Halt(Option<Vec<f64>>),
}

#[derive(Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
enum WireObservation {
    Running(Option<f64>),
    Halt(Option<Vec<Option<f64>>>),
}

pub fn parse_observation(payload: &str) -> Result<Observation, serde_json::Error> {
    Ok(match serde_json::from_str(payload)? {
        WireObservation::Running(v) => Observation::Running(v),
        // Non-numeric elements are kept as NaN so decoding rejects them.
        WireObservation::Halt(v) => Observation::Halt(
            v.map(|list| list.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect()),
        ),
    })
}

/// Resolves at most once, no matter how often it is triggered.
#[derive(Debug)]
pub struct HaltLatch {
    tx: Option<oneshot::Sender<()>>,
}

impl HaltLatch {
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (HaltLatch { tx: Some(tx) }, rx)
    }

    /// Returns true only for the call that resolved the latch.
    pub fn resolve(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.tx.is_none()
    }
}

/// Output snapshot of one run as delivered with the halt.
#[derive(Debug, Clone, Default)]
pub struct OutputCell {
    inner: Arc<Mutex<Option<Vec<f64>>>>,
}

impl OutputCell {
    pub fn store(&self, value: Option<Vec<f64>>) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }

    pub fn latest(&self) -> Option<Vec<f64>> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Rust side of the page observers: the halt report fills the cell and then
/// resolves the latch.
#[derive(Debug)]
pub struct ObserverSet {
    latch: HaltLatch,
    output: OutputCell,
}

impl ObserverSet {
    pub fn new(latch: HaltLatch, output: OutputCell) -> Self {
        ObserverSet { latch, output }
    }

    pub fn dispatch(&mut self, observation: Observation) {
        match observation {
            Observation::Running(value) => {
                tracing::trace!(?value, "running flag changed");
            }
            Observation::Halt(snapshot) => {
                if self.latch.is_resolved() {
                    return;
                }
                self.output.store(snapshot);
                self.latch.resolve();
                tracing::debug!("running flag reached zero");
            }
        }
    }

    pub fn halted(&self) -> bool {
        self.latch.is_resolved()
    }
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Feeds `observations` through a fresh [`ObserverSet`] until the first halt
/// report, then returns the output snapshot it carried.
///
/// Never resolves if no halt arrives and the stream stays open; wrap in
/// `tokio::time::timeout` to bound it. Must be called from inside a tokio
/// runtime.
pub async fn await_halt<S>(observations: S) -> Result<Option<Vec<f64>>, SandboxError>
where
    S: Stream<Item = Observation> + Send + Unpin + 'static,
{
    let (latch, halted) = HaltLatch::new();
    let output = OutputCell::default();
    let mut observers = ObserverSet::new(latch, output.clone());

    let mut pump = AbortOnDrop(tokio::spawn(async move {
        let mut observations = observations;
        while let Some(observation) = observations.next().await {
            observers.dispatch(observation);
            if observers.halted() {
                break;
            }
        }
    }));

    if halted.await.is_err() {
        return Err(SandboxError::ObserversClosed);
    }
    (&mut pump.0)
        .await
        .map_err(|e| SandboxError::evaluation("observer task", e))?;

    Ok(output.latest())
}
