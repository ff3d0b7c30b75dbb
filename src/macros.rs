/// Declares a record type and implements [`Record`](crate::Record),
/// [`Encode`](crate::Encode) and [`Decode`](crate::Decode) for it.
///
/// Each field may carry one `#[form(...)]` attribute (after its doc comments)
/// with any of:
///
/// * `rename = "key"`: the wire key, `"-"` excludes the field;
/// * `omit_empty`: leave the field out when it is empty;
/// * `skip`: exclude the field;
/// * `flatten`: embed a record-typed field, promoting its fields into this one.
///
/// Every field type must implement both `Encode` and `Decode`. Generic
/// records are not supported.
///
/// ```
/// form_qs::record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Page {
///         pub title: String,
///         #[form(rename = "n", omit_empty)]
///         pub number: u32,
///     }
/// }
///
/// let page = Page { title: "Intro".into(), number: 0 };
/// assert_eq!(form_qs::to_string(&page).unwrap(), "title=Intro");
///
/// let page: Page = form_qs::from_str("title=Intro&n=3").unwrap();
/// assert_eq!(page, Page { title: "Intro".into(), number: 3 });
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[form($($opt:tt)*)])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn schema(&self) -> $crate::Schema {
                <Self as $crate::Record>::describe()
            }

            fn describe() -> $crate::Schema {
                const FIELDS: &[$crate::FieldDecl] = &[$(
                    $crate::__field_decl!(
                        $crate::FieldDecl::new(
                            stringify!($field),
                            <$ty as $crate::Encode>::record_schema,
                        );
                        $($($opt)*)?
                    )
                ),*];
                $crate::Schema::of::<$name>(stringify!($name), FIELDS)
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn field(&self, index: usize) -> Option<&dyn $crate::Encode> {
                let mut i = 0usize;
                $(
                    if index == i {
                        return Some(&self.$field);
                    }
                    i += 1;
                )*
                None
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn field_mut(&mut self, index: usize) -> Option<&mut dyn $crate::Decode> {
                let mut i = 0usize;
                $(
                    if index == i {
                        return Some(&mut self.$field);
                    }
                    i += 1;
                )*
                None
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, encoder: $crate::Encoder<'_>) -> $crate::Result<$crate::Node> {
                encoder.record(self)
            }

            fn is_empty_value(&self) -> bool {
                true $(&& $crate::Encode::is_empty_value(&self.$field))*
            }

            fn as_record(&self) -> Option<&dyn $crate::Record> {
                Some(self)
            }

            fn record_schema() -> Option<$crate::Schema> {
                Some(<Self as $crate::Record>::describe())
            }
        }

        impl $crate::Decode for $name {
            fn decode(&mut self, decoder: $crate::Decoder<'_>) -> $crate::Result<()> {
                decoder.record(self)
            }

            fn as_record_mut(&mut self) -> Option<&mut dyn $crate::Record> {
                Some(self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_decl {
    ($decl:expr;) => {
        $decl
    };
    ($decl:expr; , $($rest:tt)*) => {
        $crate::__field_decl!($decl; $($rest)*)
    };
    ($decl:expr; rename = $key:literal $($rest:tt)*) => {
        $crate::__field_decl!($decl.rename($key); $($rest)*)
    };
    ($decl:expr; omit_empty $($rest:tt)*) => {
        $crate::__field_decl!($decl.omit_empty(); $($rest)*)
    };
    ($decl:expr; skip $($rest:tt)*) => {
        $crate::__field_decl!($decl.skip(); $($rest)*)
    };
    ($decl:expr; flatten $($rest:tt)*) => {
        $crate::__field_decl!($decl.flatten(); $($rest)*)
    };
}

/// Implements [`Encode`](crate::Encode) and [`Decode`](crate::Decode) for
/// types with a custom text form, through their
/// [`MarshalText`](crate::MarshalText) and
/// [`UnmarshalText`](crate::UnmarshalText) implementations.
///
/// The text hook takes precedence over any structure the type has, and its
/// output is written even when empty.
///
/// ```
/// use form_qs::{BoxError, MarshalText, UnmarshalText};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Pair(u16, u16);
///
/// impl MarshalText for Pair {
///     fn marshal_text(&self) -> Result<String, BoxError> {
///         Ok(format!("{}_{}", self.0, self.1))
///     }
/// }
///
/// impl UnmarshalText for Pair {
///     fn unmarshal_text(&mut self, text: &str) -> Result<(), BoxError> {
///         let (a, b) = text.split_once('_').ok_or("missing `_`")?;
///         *self = Pair(a.parse()?, b.parse()?);
///         Ok(())
///     }
/// }
///
/// form_qs::text!(Pair);
///
/// assert_eq!(form_qs::to_string(&Pair(1, 2)).unwrap(), "=1_2");
/// let pair: Pair = form_qs::from_str("=3_4").unwrap();
/// assert_eq!(pair, Pair(3, 4));
/// ```
#[macro_export]
macro_rules! text {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Encode for $ty {
                fn encode(&self, encoder: $crate::Encoder<'_>) -> $crate::Result<$crate::Node> {
                    encoder.marshal(self)
                }
            }

            impl $crate::Decode for $ty {
                fn decode(&mut self, decoder: $crate::Decoder<'_>) -> $crate::Result<()> {
                    decoder.unmarshal(self)
                }
            }
        )+
    };
}
