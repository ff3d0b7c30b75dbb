use std::borrow::Cow;

use crate::error::Result;

#[inline(always)]
fn char_to_digit(c: u8) -> Option<u32> {
    char::from(c).to_digit(16)
}

/// Decodes the input string, applying the following:
/// - Replaces `+` with a space
/// - Decodes percent-encoded characters
///
/// Malformed percent sequences are kept as they are.
///
/// This code is adapted from `rust-url` which contains each of the following
/// in slightly separate functions.
pub fn decode(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.iter().any(|&b| b == b'+' || b == b'%') {
        // nothing to decode
        return Cow::Borrowed(input);
    }

    let mut bytes_iter = input.iter().enumerate();

    let mut decoded = Vec::with_capacity(input.len());
    let mut last_segment = 0;

    while let Some((idx, &b)) = bytes_iter.next() {
        if b == b'+' {
            decoded.extend_from_slice(&input[last_segment..idx]);
            // push space
            decoded.push(b' ');
            last_segment = idx + 1;
        } else if b == b'%' {
            // the two bytes after `%` are only consumed when both are hex
            // digits; otherwise the `%` is kept and they are decoded as usual
            let Some(h) = input.get(idx + 1).and_then(|b| char_to_digit(*b)) else {
                continue;
            };
            let Some(l) = input.get(idx + 2).and_then(|b| char_to_digit(*b)) else {
                continue;
            };
            bytes_iter.nth(1);

            decoded.extend_from_slice(&input[last_segment..idx]);

            let decoded_byte = h as u8 * 0x10 + l as u8;
            decoded.push(decoded_byte);
            last_segment = idx + 3;
        }
    }

    decoded.extend_from_slice(&input[last_segment..]);
    Cow::Owned(decoded)
}

/// Decodes the input and checks that the result is UTF-8.
pub fn decode_text(input: &[u8]) -> Result<String> {
    match decode(input) {
        Cow::Borrowed(bytes) => Ok(std::str::from_utf8(bytes)?.to_owned()),
        Cow::Owned(bytes) => String::from_utf8(bytes).map_err(|e| e.utf8_error().into()),
    }
}
