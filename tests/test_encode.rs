use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use form_qs::{Config, Encode, Error, record};
use num_complex::Complex64;
use pretty_assertions::assert_eq;

#[test]
fn scalars_at_the_root() {
    assert_eq!(form_qs::to_string(&false).unwrap(), "=");
    assert_eq!(form_qs::to_string(&true).unwrap(), "=true");
    assert_eq!(form_qs::to_string(&-42i32).unwrap(), "=-42");
    assert_eq!(form_qs::to_string(&-6.6f64).unwrap(), "=-6.6");
    assert_eq!(
        form_qs::to_string(&Complex64::new(-42.0, -6.6)).unwrap(),
        "=-42-6.6i"
    );
    assert_eq!(form_qs::to_string("X & Y & Z").unwrap(), "=X+%26+Y+%26+Z");
}

record! {
    struct Thing1 {
        #[form(rename = "name", omit_empty)]
        string: String,
        #[form(rename = "num", omit_empty)]
        integer: Option<u32>,
    }
}

record! {
    struct Thing2 {
        #[form(rename = "name", omit_empty)]
        string: String,
        #[form(rename = "num", omit_empty)]
        integer: u32,
    }
}

record! {
    struct Thing3 {
        #[form(rename = "name")]
        string: String,
        #[form(rename = "num")]
        integer: Option<u32>,
    }
}

record! {
    struct Thing4 {
        #[form(rename = "name")]
        string: String,
        #[form(rename = "num")]
        integer: u32,
    }
}

fn thing1(s: &str, n: Option<u32>) -> Thing1 {
    Thing1 {
        string: s.to_string(),
        integer: n,
    }
}

fn thing2(s: &str, n: u32) -> Thing2 {
    Thing2 {
        string: s.to_string(),
        integer: n,
    }
}

fn thing3(s: &str, n: Option<u32>) -> Thing3 {
    Thing3 {
        string: s.to_string(),
        integer: n,
    }
}

fn thing4(s: &str, n: u32) -> Thing4 {
    Thing4 {
        string: s.to_string(),
        integer: n,
    }
}

#[test]
fn keep_zero_values() {
    let cases: [(&dyn Encode, &str, &str); 8] = [
        (&thing1("test", Some(0)), "name=test&num=", "name=test&num=0"),
        (&thing2("test", 0), "name=test", "name=test"),
        (&thing3("test", Some(0)), "name=test&num=", "name=test&num=0"),
        (&thing4("test", 0), "name=test&num=", "name=test&num=0"),
        (&thing1("", Some(0)), "num=", "num=0"),
        (&thing2("", 0), "", ""),
        (&thing3("", Some(0)), "name=&num=", "name=&num=0"),
        (&thing4("", 0), "name=&num=", "name=&num=0"),
    ];
    for (value, blank, kept) in cases {
        let config = Config::new();
        assert_eq!(config.encode_to_string(value).unwrap(), blank);
        let config = config.keep_zero_values(true);
        assert_eq!(config.encode_to_string(value).unwrap(), kept);
    }
}

#[test]
fn omit_empty_by_default() {
    let cases: [(&dyn Encode, &str, &str); 7] = [
        (&thing3("test", Some(42)), "name=test&num=42", "name=test&num=42"),
        (&thing3("", Some(42)), "name=&num=42", "num=42"),
        (&thing3("test", None), "name=test&num=", "name=test"),
        (&thing4("test", 0), "name=test&num=", "name=test"),
        (&thing4("test", 42), "name=test&num=42", "name=test&num=42"),
        (&thing1("test", Some(0)), "name=test&num=", "name=test&num="),
        (&thing2("test", 0), "name=test", "name=test"),
    ];
    for (value, kept, omitted) in cases {
        let config = Config::new();
        assert_eq!(config.encode_to_string(value).unwrap(), kept);
        let config = config.omit_empty(true);
        assert_eq!(config.encode_to_string(value).unwrap(), omitted);
    }
}

record! {
    #[derive(Default)]
    struct Cyclic {
        name: String,
        next: Option<Rc<RefCell<Cyclic>>>,
    }
}

record! {
    #[derive(Default)]
    struct Directory {
        entries: BTreeMap<String, Rc<RefCell<Directory>>>,
    }
}

record! {
    #[derive(Default)]
    struct Leaf {
        value: String,
    }
}

record! {
    #[derive(Default)]
    struct Dag {
        a: Rc<Leaf>,
        b: Rc<Leaf>,
    }
}

#[test]
fn self_referential_pointer_is_a_cycle() {
    let a = Rc::new(RefCell::new(Cyclic {
        name: "a".to_string(),
        next: None,
    }));
    a.borrow_mut().next = Some(Rc::clone(&a));

    let err = form_qs::to_string(&a).unwrap_err();
    assert!(matches!(err, Error::Cycle(_)), "got: {err}");
    a.borrow_mut().next = None;
}

#[test]
fn map_containing_itself_is_a_cycle() {
    let root = Rc::new(RefCell::new(Directory::default()));
    root.borrow_mut()
        .entries
        .insert("self".to_string(), Rc::clone(&root));

    let err = form_qs::to_string(&root).unwrap_err();
    assert!(matches!(err, Error::Cycle(_)), "got: {err}");
    root.borrow_mut().entries.clear();
}

#[test]
fn shared_pointers_are_not_a_cycle() {
    let shared = Rc::new(Leaf {
        value: "shared".to_string(),
    });
    let dag = Dag {
        a: Rc::clone(&shared),
        b: shared,
    };
    assert_eq!(
        form_qs::to_string(&dag).unwrap(),
        "a.value=shared&b.value=shared"
    );
}

#[test]
fn depth_limit() {
    let nested = vec![vec![vec![vec!["deep"]]]];
    assert_eq!(
        form_qs::to_string(&nested).unwrap(),
        "0.0.0.0=deep"
    );
    let err = Config::new()
        .max_depth(2)
        .encode_to_string(&nested)
        .unwrap_err();
    assert!(matches!(err, Error::DepthLimit(2)), "got: {err}");
}

#[test]
fn custom_delimiters() {
    let config = Config::new().delimiter(':').pair_delimiter(';');
    let value = BTreeMap::from([("a:b", vec![1, 2])]);
    assert_eq!(
        config.encode_to_string(&value).unwrap(),
        "a%5C%3Ab%3A0=1;a%5C%3Ab%3A1=2"
    );
}

#[test]
fn unsupported_shapes() {
    let callback: fn(u8) -> u8 = |x| x;
    let callbacks = vec![callback];
    let err = form_qs::to_string(&callbacks).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "got: {err}");
}

#[test]
fn rejected_writes() {
    struct Full;

    impl std::io::Write for Full {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = form_qs::to_writer(&vec!["a", "b"], &mut Full).unwrap_err();
    assert!(matches!(err, Error::Write(_)), "got: {err}");
}

#[test]
fn failed_encoding_writes_nothing() {
    let callback: fn(u8) -> u8 = |x| x;
    let value = BTreeMap::from([("first", vec![]), ("second", vec![callback])]);
    let mut out = Vec::new();
    let err = form_qs::to_writer(&value, &mut out).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)), "got: {err}");
    assert!(out.is_empty());
}

#[test]
fn invalid_configs_are_rejected() {
    let value = BTreeMap::from([("a", 1)]);

    let err = Config::new()
        .delimiter('/')
        .escape('/')
        .encode_to_string(&value)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)), "got: {err}");

    let err = Config::new()
        .pair_delimiter('§')
        .encode_to_string(&value)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)), "got: {err}");

    let mut decoded: BTreeMap<String, i32> = BTreeMap::new();
    let err = Config::new()
        .pair_delimiter('=')
        .decode_str("a=1", &mut decoded)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)), "got: {err}");
    assert!(decoded.is_empty());
}
