use std::path::Path;

use serde_json::{Map, Value};

use crate::error::StateError;

/// A calculator state document as emitted by the graph compiler.
///
/// Held as the parsed JSON value so every field the runner does not touch,
/// and the key order of all of them, survives patching unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramState {
    doc: Value,
}

impl ProgramState {
    pub fn ticker_playing(&self) -> bool {
        self.doc
            .pointer("/expressions/ticker/playing")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn expressions(&self) -> &[Value] {
        self.doc
            .pointer("/expressions/list")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// `latex` text of every expression that has one, in document order.
    pub fn latex(&self) -> impl Iterator<Item = &str> {
        self.expressions()
            .iter()
            .filter_map(|exp| exp.get("latex").and_then(Value::as_str))
    }

    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, StateError> {
        serde_json::to_vec(&self.doc)
            .map_err(|e| StateError::MalformedState(format!("serialize state: {e}")))
    }

    pub(crate) fn list_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.doc
            .pointer_mut("/expressions/list")
            .and_then(Value::as_array_mut)
    }

    pub(crate) fn ticker_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.doc
            .pointer_mut("/expressions/ticker")
            .and_then(Value::as_object_mut)
    }
}

fn malformed(msg: &str) -> StateError {
    StateError::MalformedState(msg.to_string())
}

fn validate(doc: &Value) -> Result<(), StateError> {
    let expressions = doc
        .get("expressions")
        .ok_or_else(|| malformed("missing field `expressions`"))?
        .as_object()
        .ok_or_else(|| malformed("expressions must be an object"))?;

    let ticker = expressions
        .get("ticker")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("expressions.ticker must be an object"))?;
    match ticker.get("playing") {
        None | Some(Value::Bool(_)) => {}
        Some(_) => return Err(malformed("expressions.ticker.playing must be a boolean")),
    }

    match expressions.get("list") {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(malformed("expressions.list must be an array")),
        None => Err(malformed("missing field `list` in expressions")),
    }
}

pub fn parse_state(bytes: &[u8]) -> Result<ProgramState, StateError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(StateError::InvalidArgument(
            "state document is empty".to_string(),
        ));
    }
    let doc: Value = serde_json::from_slice(bytes)
        .map_err(|e| StateError::MalformedState(format!("invalid JSON: {e}")))?;
    validate(&doc)?;
    Ok(ProgramState { doc })
}

/// Reads and validates a state document. `None` means the caller had no path
/// to give, which is reported as an invalid argument.
pub fn load_state_file(path: Option<&Path>) -> Result<ProgramState, StateError> {
    let Some(path) = path else {
        return Err(StateError::InvalidArgument(
            "missing state document path".to_string(),
        ));
    };
    let bytes = std::fs::read(path).map_err(|source| StateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state = parse_state(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        expressions = state.expressions().len(),
        playing = state.ticker_playing(),
        "loaded state document"
    );
    Ok(state)
}
