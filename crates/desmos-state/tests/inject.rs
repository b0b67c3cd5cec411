use desmos_state::{
    decode_stdin_expression, inject_input, parse_state, ProgramState, StateError, VariableNames,
};
use serde_json::json;

fn state(list: serde_json::Value, playing: bool) -> ProgramState {
    let doc = json!({
        "version": 8,
        "expressions": {
            "list": list,
            "ticker": { "handlerLatex": "a\\to a+1", "playing": playing }
        }
    });
    parse_state(doc.to_string().as_bytes()).expect("parse state")
}

fn compiled(playing: bool) -> ProgramState {
    state(
        json!([
            { "type": "expression", "id": 1, "latex": "m_{em0}=\\left[0,0\\right]" },
            { "type": "expression", "id": 2, "latex": "s_{tdin}=\\left[\\right]" },
            { "type": "text", "id": 3, "text": "no latex here" },
            { "type": "expression", "id": 4, "latex": "r=1", "hidden": true }
        ]),
        playing,
    )
}

#[test]
fn injects_bytes_and_starts_ticker() {
    let original = compiled(false);
    let patched = inject_input(&original, &VariableNames::default(), b"Hi").expect("inject");

    assert!(patched.ticker_playing());
    assert_eq!(
        patched.latex().collect::<Vec<_>>(),
        vec![
            "m_{em0}=\\left[0,0\\right]",
            "s_{tdin}=\\left[72,105\\right]",
            "r=1"
        ]
    );

    // Input is left alone.
    assert!(!original.ticker_playing());
    assert!(original
        .latex()
        .any(|l| l == "s_{tdin}=\\left[\\right]"));
}

#[test]
fn other_expressions_are_untouched() {
    let original = compiled(false);
    let patched = inject_input(&original, &VariableNames::default(), b"\x00\xff").expect("inject");

    for (i, (before, after)) in original
        .expressions()
        .iter()
        .zip(patched.expressions())
        .enumerate()
    {
        if i == 1 {
            let keys_before: Vec<_> = before.as_object().expect("object").keys().collect();
            let keys_after: Vec<_> = after.as_object().expect("object").keys().collect();
            assert_eq!(keys_before, keys_after);
            assert_eq!(after["latex"], "s_{tdin}=\\left[0,255\\right]");
        } else {
            assert_eq!(before, after);
        }
    }

    let value = patched.as_value();
    assert_eq!(value["version"], 8);
    assert_eq!(value["expressions"]["ticker"]["handlerLatex"], "a\\to a+1");
}

#[test]
fn encoded_input_has_one_token_per_byte() {
    let vars = VariableNames::default();
    for len in [0usize, 1, 2, 17, 300] {
        let input: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
        let patched = inject_input(&compiled(false), &vars, &input).expect("inject");
        let latex = patched
            .latex()
            .find(|l| l.starts_with("s_{tdin}="))
            .expect("stdin expression");

        let body = latex
            .trim_start_matches("s_{tdin}=\\left[")
            .trim_end_matches("\\right]");
        let tokens: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split(',').collect()
        };
        assert_eq!(tokens.len(), len);
        assert_eq!(decode_stdin_expression(&vars.stdin, latex), Some(input));
    }
}

#[test]
fn already_playing_ticker_stays_playing() {
    let patched = inject_input(&compiled(true), &VariableNames::default(), b"x").expect("inject");
    assert!(patched.ticker_playing());
}

#[test]
fn missing_placeholder_is_reported() {
    let doc = state(
        json!([
            { "type": "expression", "id": 1, "latex": "s_{tdin}=\\left[1\\right]" },
            { "type": "expression", "id": 2, "latex": "s_{tdin} = \\left[\\right]" }
        ]),
        false,
    );
    let err = inject_input(&doc, &VariableNames::default(), b"").expect_err("must fail");
    match err {
        StateError::StdinPlaceholderNotFound { placeholder } => {
            assert_eq!(placeholder, "s_{tdin}=\\left[\\right]")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn custom_stdin_variable_is_honored() {
    let vars = VariableNames {
        stdin: "i_{n}".to_string(),
        ..VariableNames::default()
    };
    let err = inject_input(&compiled(false), &vars, b"").expect_err("default name only");
    assert_eq!(err.kind(), "stdin-placeholder-not-found");

    let doc = state(
        json!([{ "type": "expression", "id": 1, "latex": "i_{n}=\\left[\\right]" }]),
        false,
    );
    let patched = inject_input(&doc, &vars, b"A").expect("inject");
    assert_eq!(patched.latex().next(), Some("i_{n}=\\left[65\\right]"));
}

#[test]
fn duplicate_placeholder_is_rejected() {
    let doc = state(
        json!([
            { "type": "expression", "id": 1, "latex": "s_{tdin}=\\left[\\right]" },
            { "type": "expression", "id": 2, "latex": "s_{tdin}=\\left[\\right]" }
        ]),
        false,
    );
    let err = inject_input(&doc, &VariableNames::default(), b"").expect_err("must fail");
    assert!(
        matches!(err, StateError::StdinPlaceholderAmbiguous { count: 2, .. }),
        "err={err}"
    );
}

#[test]
fn patched_document_keeps_key_order() {
    let src = r#"{"version":8,"graph":{"viewport":{}},"expressions":{"list":[{"type":"expression","id":"2","latex":"s_{tdin}=\\left[\\right]","hidden":true}],"ticker":{"handlerLatex":"x","playing":false,"minStepLatex":"0"}},"randomSeed":"abc"}"#;
    let original = parse_state(src.as_bytes()).expect("parse");
    let patched = inject_input(&original, &VariableNames::default(), b"A").expect("inject");

    let out = String::from_utf8(patched.to_json_bytes().expect("serialize")).expect("utf8");
    assert_eq!(
        out,
        r#"{"version":8,"graph":{"viewport":{}},"expressions":{"list":[{"type":"expression","id":"2","latex":"s_{tdin}=\\left[65\\right]","hidden":true}],"ticker":{"handlerLatex":"x","playing":true,"minStepLatex":"0"}},"randomSeed":"abc"}"#
    );
}

#[test]
fn absent_playing_is_added_to_ticker() {
    let src = r#"{"expressions":{"ticker":{"handlerLatex":"x"},"list":[{"latex":"s_{tdin}=\\left[\\right]"}]}}"#;
    let patched = inject_input(
        &parse_state(src.as_bytes()).expect("parse"),
        &VariableNames::default(),
        b"",
    )
    .expect("inject");
    assert!(patched.ticker_playing());
    let ticker: Vec<&str> = patched.as_value()["expressions"]["ticker"]
        .as_object()
        .expect("ticker")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(ticker, ["handlerLatex", "playing"]);
}
