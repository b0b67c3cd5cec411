use desmos_contracts::{LIST_CLOSE, LIST_OPEN};

/// An output list element that is not a byte value.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputError {
    pub index: usize,
    pub value: f64,
}

impl OutputError {
    pub fn kind(&self) -> &'static str {
        "invalid-output-value"
    }
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "output value {} at index {} is not a byte (expected an integer in 0..=255)",
            self.value, self.index
        )
    }
}

impl std::error::Error for OutputError {}

/// Comma-separated decimal byte values, no spaces.
pub fn encode_byte_list(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&b.to_string());
    }
    out
}

pub fn stdin_placeholder(stdin_var: &str) -> String {
    format!("{stdin_var}={LIST_OPEN}{LIST_CLOSE}")
}

pub fn stdin_expression(stdin_var: &str, bytes: &[u8]) -> String {
    format!(
        "{stdin_var}={LIST_OPEN}{}{LIST_CLOSE}",
        encode_byte_list(bytes)
    )
}

/// Inverse of [`stdin_expression`]. Returns `None` if `latex` is not a stdin
/// assignment for `stdin_var` or holds a non-byte element.
pub fn decode_stdin_expression(stdin_var: &str, latex: &str) -> Option<Vec<u8>> {
    let body = latex
        .strip_prefix(stdin_var)?
        .strip_prefix('=')?
        .strip_prefix(LIST_OPEN)?
        .strip_suffix(LIST_CLOSE)?;
    if body.is_empty() {
        return Some(Vec::new());
    }
    body.split(',').map(|tok| tok.parse::<u8>().ok()).collect()
}

/// Converts the observed output list into raw bytes.
pub fn decode_output_list(values: &[f64]) -> Result<Vec<u8>, OutputError> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if value.is_finite() && value.fract() == 0.0 && (0.0..=255.0).contains(&value) {
                Ok(value as u8)
            } else {
                Err(OutputError { index, value })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_in_order_without_spaces() {
        assert_eq!(encode_byte_list(&[]), "");
        assert_eq!(encode_byte_list(&[0, 10, 255]), "0,10,255");
    }

    #[test]
    fn stdin_expression_matches_compiler_form() {
        assert_eq!(stdin_placeholder("s_{tdin}"), "s_{tdin}=\\left[\\right]");
        assert_eq!(
            stdin_expression("s_{tdin}", b"Hi"),
            "s_{tdin}=\\left[72,105\\right]"
        );
        assert_eq!(stdin_expression("s_{tdin}", b""), stdin_placeholder("s_{tdin}"));
    }

    #[test]
    fn every_byte_survives_stdin_and_stdout_forms() {
        let all: Vec<u8> = (0..=255u8).collect();
        let latex = stdin_expression("s_{tdin}", &all);
        let decoded = decode_stdin_expression("s_{tdin}", &latex).expect("decode stdin");
        assert_eq!(decoded, all);

        let as_list: Vec<f64> = decoded.iter().map(|&b| f64::from(b)).collect();
        assert_eq!(decode_output_list(&as_list).expect("decode stdout"), all);
    }

    #[test]
    fn stdin_decode_rejects_foreign_expressions() {
        assert_eq!(decode_stdin_expression("s_{tdin}", "r=1"), None);
        assert_eq!(
            decode_stdin_expression("s_{tdin}", "s_{tdin}=\\left[1,256\\right]"),
            None
        );
    }

    #[test]
    fn output_rejects_non_bytes() {
        assert_eq!(
            decode_output_list(&[72.0, 256.0]),
            Err(OutputError {
                index: 1,
                value: 256.0
            })
        );
        assert!(decode_output_list(&[1.5]).is_err());
        assert!(decode_output_list(&[-1.0]).is_err());
        assert!(decode_output_list(&[f64::NAN]).is_err());
        assert_eq!(decode_output_list(&[72.0, 105.0]).expect("bytes"), b"Hi");
    }
}
