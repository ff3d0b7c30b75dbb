//! Scalar grammars shared by the decoder.

use std::str::FromStr;

/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their `false`
/// counterparts.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses `<re><+|-><im>i`, a bare real part, or a bare imaginary part.
///
/// Surrounding parentheses are allowed.
pub fn parse_complex<F: FromStr + Default>(text: &str) -> Option<(F, F)> {
    let text = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);
    let Some(body) = text.strip_suffix('i') else {
        return Some((text.parse().ok()?, F::default()));
    };

    let bytes = body.as_bytes();
    // the imaginary part starts at the last sign that is not an exponent sign
    let split = (1..bytes.len())
        .rev()
        .find(|&i| matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E'));
    match split {
        Some(i) => Some((body[..i].parse().ok()?, body[i..].parse().ok()?)),
        None => Some((F::default(), body.parse().ok()?)),
    }
}
