//! Canonical text of numeric scalars.

/// Shortest text that parses back to the same float: `42`, `6.6`, `1e21`.
pub fn format_float<F: ryu::Float>(v: F) -> String {
    let mut buffer = ryu::Buffer::new();
    let s = buffer.format(v);
    s.strip_suffix(".0").unwrap_or(s).to_owned()
}

/// Formats a complex number as `<re><+|-><im>i`.
pub fn format_complex<F: ryu::Float>(re: F, im: F) -> String {
    let mut s = format_float(re);
    let im = format_float(im);
    if !im.starts_with('-') {
        s.push('+');
    }
    s.push_str(&im);
    s.push('i');
    s
}
