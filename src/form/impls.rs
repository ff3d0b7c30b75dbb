use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use num_complex::Complex;

use super::{Decode, Encode, Record};
use crate::de::{scalar, Decoder};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::ser::{self, Encoder};

macro_rules! impl_integer {
    ($($ty:ty,)*) => {
        $(
            impl Encode for $ty {
                fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
                    encoder.int(*self)
                }

                fn is_empty_value(&self) -> bool {
                    *self == 0
                }
            }

            impl Decode for $ty {
                fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
                    *self = decoder.scalar()?;
                    Ok(())
                }
            }
        )*
    };
}

impl_integer! {
    u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
}

// Byte sequences are written as a single value rather than element by element.
impl Encode for u8 {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.int(*self)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0
    }

    fn encode_slice(items: &[Self], encoder: Encoder<'_>) -> Result<Node> {
        encoder.bytes(items)
    }
}

impl Decode for u8 {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        *self = decoder.scalar()?;
        Ok(())
    }

    fn decode_vec(items: &mut Vec<Self>, decoder: Decoder<'_>) -> Result<()> {
        decoder.bytes(items)
    }
}

impl Encode for f32 {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.f32(*self)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }
}

impl Decode for f32 {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        *self = decoder.scalar()?;
        Ok(())
    }
}

impl Encode for f64 {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.f64(*self)
    }

    fn is_empty_value(&self) -> bool {
        *self == 0.0
    }
}

impl Decode for f64 {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        *self = decoder.scalar()?;
        Ok(())
    }
}

impl Encode for bool {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.bool(*self)
    }

    fn is_empty_value(&self) -> bool {
        !*self
    }
}

impl Decode for bool {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        *self = decoder.bool()?;
        Ok(())
    }
}

impl Encode for char {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.char(*self)
    }

    fn is_empty_value(&self) -> bool {
        *self == '\0'
    }
}

impl Decode for char {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        *self = decoder.scalar()?;
        Ok(())
    }
}

impl Encode for str {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.str(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for String {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.str(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Decode for String {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        decoder.text()?.clone_into(self);
        Ok(())
    }
}

macro_rules! impl_complex {
    ($($float:ty,)*) => {
        $(
            impl Encode for Complex<$float> {
                fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
                    encoder.zeroable(self.is_empty_value(), || {
                        ser::scalar::format_complex(self.re, self.im)
                    })
                }

                fn is_empty_value(&self) -> bool {
                    self.re == 0.0 && self.im == 0.0
                }
            }

            impl Decode for Complex<$float> {
                fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
                    let text = decoder.text()?;
                    if text.is_empty() {
                        *self = Complex::default();
                        return Ok(());
                    }
                    let (re, im) = scalar::parse_complex::<$float>(text)
                        .ok_or_else(|| decoder.parse_error("invalid complex number"))?;
                    *self = Complex::new(re, im);
                    Ok(())
                }
            }
        )*
    };
}

impl_complex! {
    f32, f64,
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        match self {
            Some(value) => value.encode(encoder),
            None => encoder.absent(),
        }
    }

    fn is_empty_value(&self) -> bool {
        self.is_none()
    }

    fn as_record(&self) -> Option<&dyn Record> {
        self.as_ref().and_then(Encode::as_record)
    }

    fn record_schema() -> Option<super::Schema> {
        T::record_schema()
    }
}

impl<T: Decode + Default> Decode for Option<T> {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        self.get_or_insert_with(T::default).decode(decoder)
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        self.get_or_insert_with(T::default).as_record_mut()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        (**self).encode(encoder)
    }

    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }

    fn as_record(&self) -> Option<&dyn Record> {
        (**self).as_record()
    }
}

impl<T: Encode> Encode for Box<T> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        (**self).encode(encoder)
    }

    fn as_record(&self) -> Option<&dyn Record> {
        (**self).as_record()
    }

    fn record_schema() -> Option<super::Schema> {
        T::record_schema()
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        (**self).decode(decoder)
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        (**self).as_record_mut()
    }
}

macro_rules! impl_shared {
    ($($ptr:ident,)*) => {
        $(
            impl<T: Encode> Encode for $ptr<T> {
                fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
                    let id = $ptr::as_ptr(self).cast::<()>() as usize;
                    encoder.reference(id, &**self)
                }

                fn as_record(&self) -> Option<&dyn Record> {
                    (**self).as_record()
                }

                fn record_schema() -> Option<super::Schema> {
                    T::record_schema()
                }
            }

            impl<T: Decode> Decode for $ptr<T> {
                fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
                    match $ptr::get_mut(self) {
                        Some(value) => value.decode(decoder),
                        None => Err(Error::unsupported(concat!(
                            "cannot decode into a shared `",
                            stringify!($ptr),
                            "`"
                        ))),
                    }
                }

                fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
                    $ptr::get_mut(self).and_then(Decode::as_record_mut)
                }
            }
        )*
    };
}

impl_shared! {
    Rc, Arc,
}

impl<T: Encode> Encode for RefCell<T> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        let value = self
            .try_borrow()
            .map_err(|_| Error::unsupported("`RefCell` is mutably borrowed"))?;
        value.encode(encoder)
    }

    fn is_empty_value(&self) -> bool {
        self.try_borrow().is_ok_and(|value| value.is_empty_value())
    }
}

impl<T: Decode> Decode for RefCell<T> {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        self.get_mut().decode(decoder)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        T::encode_slice(self, encoder)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        T::encode_slice(self, encoder)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        T::decode_vec(self, decoder)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.seq(self)
    }

    fn is_empty_value(&self) -> bool {
        N == 0
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        decoder.array(self)
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.unordered_map(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Default + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher,
{
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        decoder.map(|k, v| {
            self.insert(k, v);
        })
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.map(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Decode + Default + Ord, V: Decode + Default> Decode for BTreeMap<K, V> {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        decoder.map(|k, v| {
            self.insert(k, v);
        })
    }
}

impl<K: Encode, V: Encode, S> Encode for IndexMap<K, V, S> {
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
        encoder.map(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Decode for IndexMap<K, V, S>
where
    K: Decode + Default + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher,
{
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        decoder.map(|k, v| {
            self.insert(k, v);
        })
    }
}

impl Encode for Node {
    fn encode(&self, _encoder: Encoder<'_>) -> Result<Node> {
        Ok(self.clone())
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Decode for Node {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()> {
        *self = decoder.node();
        Ok(())
    }
}

macro_rules! impl_unsupported {
    ($($ty:ty => $what:literal,)*) => {
        $(
            impl<T: ?Sized> Encode for $ty {
                fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
                    encoder.unsupported($what)
                }
            }

            impl<T: ?Sized> Decode for $ty {
                fn decode(&mut self, _decoder: Decoder<'_>) -> Result<()> {
                    Err(Error::unsupported($what))
                }
            }
        )*
    };
}

impl_unsupported! {
    *const T => "raw pointer",
    *mut T => "raw pointer",
}

macro_rules! impl_fn_pointer {
    ($(($($arg:ident),*),)*) => {
        $(
            impl<R, $($arg),*> Encode for fn($($arg),*) -> R {
                fn encode(&self, encoder: Encoder<'_>) -> Result<Node> {
                    encoder.unsupported("function")
                }
            }

            impl<R, $($arg),*> Decode for fn($($arg),*) -> R {
                fn decode(&mut self, _decoder: Decoder<'_>) -> Result<()> {
                    Err(Error::unsupported("function"))
                }
            }
        )*
    };
}

impl_fn_pointer! {
    (),
    (A),
    (A, B),
    (A, B, C),
}
