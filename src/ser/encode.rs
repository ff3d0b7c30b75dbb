use percent_encoding::AsciiSet;

/// The query escape set used by `application/x-www-form-urlencoded` forms:
/// every byte except the ASCII alphanumerics and the unreserved
/// characters `-`, `.`, `_` and `~`.
///
/// SPACE is part of the set but written as `+` (see [`encode`]).
const QUERY_SET: &AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encodes a key or value for use in a form, applying percent-encoding as
/// needed. Spaces are encoded as `+`.
///
/// The function returns an iterator to avoid allocations when no encoding is needed.
pub fn encode(b: &[u8]) -> impl Iterator<Item = &str> + '_ {
    percent_encoding::percent_encode(b, QUERY_SET).map(|s| if s == "%20" { "+" } else { s })
}

/// Appends the encoded form of `s` to `out`.
pub fn encode_into(out: &mut String, s: &str) {
    if s
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
    {
        // nothing to escape
        out.push_str(s);
        return;
    }
    out.extend(encode(s.as_bytes()));
}
