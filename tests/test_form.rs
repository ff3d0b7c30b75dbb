//! A record exercising every supported shape, encoded and decoded whole.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use form_qs::{BoxError, Config, MarshalText, UnmarshalText, record, text};
use num_complex::Complex64;
use pretty_assertions::assert_eq;

#[derive(Debug, Default, Clone, PartialEq)]
struct U {
    a: u16,
    b: u16,
}

impl MarshalText for U {
    fn marshal_text(&self) -> Result<String, BoxError> {
        Ok(format!("{}_{}", self.a, self.b))
    }
}

impl UnmarshalText for U {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), BoxError> {
        let (a, b) = text.split_once('_').ok_or("expected `a_b`")?;
        *self = U {
            a: a.parse()?,
            b: b.parse()?,
        };
        Ok(())
    }
}

text!(U);

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Embedded {
        #[form(rename = "Bytes")]
        bytes: Vec<u8>,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Element {
        #[form(rename = "Z")]
        z: NaiveDate,
        #[form(rename = "U")]
        u: U,
        #[form(rename = "Up")]
        up: Option<Box<U>>,
        #[form(rename = "-")]
        u2: U,
        #[form(skip)]
        e: Embedded,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Pair {
        #[form(rename = "A")]
        a: String,
        #[form(rename = "B")]
        b: String,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Everything {
        #[form(rename = "B")]
        b: bool,
        #[form(rename = "life")]
        i: i64,
        #[form(rename = "F")]
        f: f64,
        #[form(rename = "C")]
        c: Complex64,
        #[form(rename = "R", omit_empty)]
        r: i32,
        #[form(rename = "Re", omit_empty)]
        re: i32,
        #[form(rename = "S")]
        s: String,
        #[form(rename = "T")]
        t: DateTime<Utc>,
        #[form(rename = "A")]
        a: [String; 3],
        #[form(rename = "M")]
        m: BTreeMap<String, i64>,
        #[form(rename = "-")]
        y: i64,
        #[form(skip)]
        ye: i64,
        #[form(rename = "Zs")]
        zs: Vec<Element>,
        #[form(rename = "E")]
        e: Embedded,
        #[form(rename = "P.D\\Q.B")]
        p: Pair,
    }
}

const CANONICAL: &str = "A.0=x&A.1=y&A.2=z&B=true&C=42%2B6.6i&E.Bytes=%00%01%02&F=6.6\
&M.Bar=8&M.Foo=7&M.Qux=9&P%5C.D%5C%5CQ%5C.B.A=P%2FD&P%5C.D%5C%5CQ%5C.B.B=Q-B&R=8734\
&S=Hello%2C+there.&T=2013-10-01T07%3A05%3A34.000000088Z&Zs.0.U=11_22&Zs.0.Up=33_44\
&Zs.0.Z=2006-12-01&life=42";

fn everything() -> Everything {
    Everything {
        b: true,
        i: 42,
        f: 6.6,
        c: Complex64::new(42.0, 6.6),
        r: 8734,
        re: 0,
        s: "Hello, there.".to_string(),
        t: Utc.with_ymd_and_hms(2013, 10, 1, 7, 5, 34).unwrap()
            + chrono::Duration::nanoseconds(88),
        a: ["x".to_string(), "y".to_string(), "z".to_string()],
        m: BTreeMap::from([
            ("Foo".to_string(), 7),
            ("Bar".to_string(), 8),
            ("Qux".to_string(), 9),
        ]),
        y: 786,
        ye: 0,
        zs: vec![Element {
            z: NaiveDate::from_ymd_opt(2006, 12, 1).unwrap(),
            u: U { a: 11, b: 22 },
            up: Some(Box::new(U { a: 33, b: 44 })),
            u2: U::default(),
            e: Embedded::default(),
        }],
        e: Embedded {
            bytes: vec![0, 1, 2],
        },
        p: Pair {
            a: "P/D".to_string(),
            b: "Q-B".to_string(),
        },
    }
}

/// The canonical form reordered, with `;` separators, unescaped values
/// and empty pairs.
const VARIATION: &str = ";C=42%2B6.6i;A.0=x;M.Bar=8;F=6.6;A.1=y;R=8734;A.2=z;Zs.0.Up=33_44;\
B=true;M.Foo=7;T=2013-10-01T07:05:34.000000088Z;E.Bytes=%00%01%02;Zs.0.U=11_22;\
Zs.0.Z=2006-12-01;M.Qux=9;life=42;S=Hello,+there.;P\\.D\\\\Q\\.B.A=P/D;P\\.D\\\\Q\\.B.B=Q-B;";

fn blank() -> Everything {
    Everything {
        y: 786,
        ..Everything::default()
    }
}

#[test]
fn encode_canonical() {
    assert_eq!(form_qs::to_string(&everything()).unwrap(), CANONICAL);
}

#[test]
fn encode_to_multimap() {
    let values = form_qs::to_multimap(&everything()).unwrap();
    assert_eq!(values["P\\.D\\\\Q\\.B.A"], ["P/D"]);
    assert_eq!(values["Zs.0.Z"], ["2006-12-01"]);
    assert!(!values.contains_key("Re"));
    assert!(!values.contains_key("Zs.0.U2"));
    assert_eq!(values.len(), 19);
}

#[test]
fn encode_to_writer() {
    let mut out = Vec::new();
    form_qs::to_writer(&everything(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), CANONICAL);
}

#[test]
fn decode_canonical() {
    let mut decoded = blank();
    form_qs::decode_str(CANONICAL, &mut decoded).unwrap();
    assert_eq!(decoded, everything());
}

#[test]
fn decode_variation() {
    let mut decoded = blank();
    form_qs::decode_str(VARIATION, &mut decoded).unwrap();
    assert_eq!(decoded, everything());
}

#[test]
fn decode_from_reader() {
    let mut decoded = blank();
    form_qs::decode_reader(VARIATION.as_bytes(), &mut decoded).unwrap();
    assert_eq!(decoded, everything());
}

#[test]
fn decode_from_multimap() {
    let values = form_qs::to_multimap(&everything()).unwrap();
    let mut decoded = blank();
    form_qs::decode_multimap(&values, &mut decoded).unwrap();
    assert_eq!(decoded, everything());
}

#[test]
fn skipped_fields_are_untouched() {
    let mut decoded = blank();
    form_qs::decode_str("Y=1&Ye=2&-=3", &mut decoded).unwrap();
    assert_eq!(decoded, blank());
}

#[test]
fn canonical_into_an_untyped_tree() {
    let tree: form_qs::Node = form_qs::from_str(VARIATION).unwrap();
    assert_eq!(
        tree.get("Zs")
            .and_then(|zs| zs.get("0"))
            .and_then(|z| z.get("Up"))
            .and_then(form_qs::Node::as_str),
        Some("33_44")
    );
    assert_eq!(
        tree.get("P.D\\Q.B")
            .and_then(|p| p.get("A"))
            .and_then(form_qs::Node::as_str),
        Some("P/D")
    );
    assert_eq!(form_qs::to_string(&tree).unwrap(), CANONICAL);
}

#[test]
fn canonical_with_custom_delimiters() {
    let config = Config::new().delimiter('/').escape('~').pair_delimiter(';');
    let encoded = config.encode_to_string(&everything()).unwrap();
    assert!(encoded.contains("Zs%2F0%2FZ=2006-12-01;"), "got: {encoded}");
    assert!(encoded.contains("P.D%5CQ.B%2FA=P%2FD"), "got: {encoded}");

    let mut decoded = blank();
    config.decode_str(&encoded, &mut decoded).unwrap();
    assert_eq!(decoded, everything());
}
