use std::slice::Iter;

use tracing::trace;

use crate::config::Config;
use crate::error::Result;
use crate::node::Multimap;

mod decode;

/// Splits a form into percent-decoded `key -> values` pairs.
///
/// Pairs are separated by `&`, `;` or the configured pair delimiter. A pair
/// without `=` has the empty value, and repeated keys collect their values in
/// input order.
pub fn parse(encoded: &[u8], config: &Config) -> Result<Multimap> {
    let mut parser = Parser::new(encoded, config);
    let mut output = Multimap::new();
    parser.parse(&mut output)?;

    Ok(output)
}

/// The `Parser` struct is a stateful form parser.
///
/// It iterates over a slice of bytes, maintaining an accumulator range `(start, end)`
/// to track the current segment being parsed. This approach avoids allocations
/// by working directly with slices of the input string.
struct Parser<'qs> {
    inner: &'qs [u8],
    iter: Iter<'qs, u8>,
    index: usize,
    acc: (usize, usize),
    pair_delimiter: Option<u8>,
}

impl<'qs> Parser<'qs> {
    fn new(encoded: &'qs [u8], config: &Config) -> Self {
        Parser {
            inner: encoded,
            iter: encoded.iter(),
            acc: (0, 0),
            index: 0,
            pair_delimiter: u8::try_from(config.pair_delimiter).ok(),
        }
    }

    fn next(&mut self) -> Option<u8> {
        self.acc.1 = self.index;
        self.index += 1;
        self.iter.next().copied()
    }

    fn is_separator(&self, b: u8) -> bool {
        b == b'&' || b == b';' || Some(b) == self.pair_delimiter
    }

    /// Resets the accumulator range by setting `(start, end)` to `(end, end)`.
    fn clear_acc(&mut self) {
        self.acc = (self.index, self.index);
    }

    /// Decodes the accumulated bytes.
    fn collect(&mut self) -> Result<String> {
        let text = decode::decode_text(&self.inner[self.acc.0..self.acc.1])?;
        self.clear_acc();
        Ok(text)
    }

    /// Eats bytes up until the next separator (or the end of the input) as
    /// the value. Returns whether the input is exhausted.
    fn collect_value(&mut self) -> Result<(String, bool)> {
        self.clear_acc();
        let end = loop {
            match self.next() {
                None => break true,
                Some(b) if self.is_separator(b) => break false,
                Some(_) => continue,
            }
        };
        Ok((self.collect()?, end))
    }

    fn parse(&mut self, output: &mut Multimap) -> Result<()> {
        loop {
            match self.next() {
                None => {
                    // a trailing key without a value
                    if self.acc.0 != self.acc.1 {
                        let key = self.collect()?;
                        insert(output, key, String::new());
                    }
                    return Ok(());
                }
                Some(b) if self.is_separator(b) => {
                    // skip empty pairs such as `a=1&&b=2`
                    if self.acc.0 != self.acc.1 {
                        let key = self.collect()?;
                        insert(output, key, String::new());
                    }
                }
                Some(b'=') => {
                    // an explicit `=` with nothing before it is the empty key
                    let key = self.collect()?;
                    let (value, end) = self.collect_value()?;
                    insert(output, key, value);
                    if end {
                        return Ok(());
                    }
                }
                Some(_) => continue,
            }
            self.clear_acc();
        }
    }
}

fn insert(output: &mut Multimap, key: String, value: String) {
    trace!(key = %key, value = %value, "parsed form pair");
    output.entry(key).or_default().push(value);
}
