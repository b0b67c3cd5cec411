use serde_json::Value;

use crate::codec::{stdin_expression, stdin_placeholder};
use crate::document::ProgramState;
use crate::error::StateError;
use crate::vars::VariableNames;

/// Returns a copy of `state` with the empty stdin assignment replaced by
/// `input` and the ticker set to play. `state` itself is not modified.
///
/// Exactly one expression must carry the empty placeholder; no other
/// expression is touched, and patched fields keep their position.
pub fn inject_input(
    state: &ProgramState,
    vars: &VariableNames,
    input: &[u8],
) -> Result<ProgramState, StateError> {
    let placeholder = stdin_placeholder(&vars.stdin);

    let matches: Vec<usize> = state
        .expressions()
        .iter()
        .enumerate()
        .filter(|(_, exp)| exp.get("latex").and_then(Value::as_str) == Some(placeholder.as_str()))
        .map(|(i, _)| i)
        .collect();

    let index = match matches.as_slice() {
        [] => return Err(StateError::StdinPlaceholderNotFound { placeholder }),
        [index] => *index,
        many => {
            return Err(StateError::StdinPlaceholderAmbiguous {
                placeholder,
                count: many.len(),
            })
        }
    };

    let mut patched = state.clone();
    let latex = patched
        .list_mut()
        .and_then(|list| list.get_mut(index))
        .and_then(|exp| exp.get_mut("latex"))
        .ok_or_else(|| StateError::MalformedState("expressions.list changed shape".to_string()))?;
    *latex = Value::String(stdin_expression(&vars.stdin, input));

    // Replacing an existing key keeps its position in the map.
    patched
        .ticker_mut()
        .ok_or_else(|| StateError::MalformedState("expressions.ticker must be an object".to_string()))?
        .insert("playing".to_string(), Value::Bool(true));

    tracing::debug!(
        expression = index,
        input_bytes = input.len(),
        "patched stdin placeholder"
    );
    Ok(patched)
}
