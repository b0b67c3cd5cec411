use desmos_contracts::{OBSERVER_BINDING, OUTPUT_SNAPSHOT};
use desmos_state::VariableNames;
use serde_json::Value;

fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// True once the calculator API is available on the page.
pub fn ready_check_script() -> &'static str {
    r#"typeof window.Calc === "object" && window.Calc !== null && typeof window.Calc.setState === "function""#
}

/// Attaches one helper expression per observed variable.
///
/// The output observer only overwrites a page-side snapshot. The running
/// observer reports each non-zero value, and on the first zero schedules one
/// `halt` report carrying that snapshot, so it is read after every observer
/// callback of the same evaluation has run. NaN and undefined are sent as
/// `null`.
pub fn observer_script(vars: &VariableNames) -> String {
    format!(
        r#"(() => {{
  const report = (kind, value) => window[{binding}](JSON.stringify({{ kind, value: value ?? null }}));
  window.{snapshot} = null;
  let halted = false;
  const running = window.Calc.HelperExpression({{ latex: {running} }});
  running.observe("numericValue", () => {{
    if (running.numericValue === 0) {{
      if (!halted) {{
        halted = true;
        setTimeout(() => report("halt", window.{snapshot}), 0);
      }}
    }} else {{
      report("running", running.numericValue);
    }}
  }});
  const stdout = window.Calc.HelperExpression({{ latex: {stdout} }});
  stdout.observe("listValue", () => {{
    window.{snapshot} = stdout.listValue ?? null;
  }});
  window.__desmosRunnerHelpers = [running, stdout];
  return true;
}})()"#,
        binding = js_string(OBSERVER_BINDING),
        snapshot = OUTPUT_SNAPSHOT,
        running = js_string(&vars.running),
        stdout = js_string(&vars.stdout),
    )
}

/// `Calc.setState` with the document inlined as a JSON literal.
pub fn set_state_script(state: &Value) -> String {
    format!("(() => {{ window.Calc.setState({state}); return true; }})()")
}
