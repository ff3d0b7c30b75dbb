use std::io;
use std::str::Utf8Error;

use thiserror::Error;

/// Errors raised while encoding or decoding forms.
///
/// Every failure inside the recursive walk is surfaced as exactly one of
/// these variants. Decode errors carry the offending key, rendered the way it
/// appears on the wire (delimiters escaped).
#[derive(Debug, Error)]
pub enum Error {
    /// The value has a shape that cannot be represented in a form.
    #[error("unsupported value: {0}")]
    Unsupported(String),

    /// A reference was reached again while it was still being encoded.
    #[error("cycle detected: `{0}` refers back to itself")]
    Cycle(String),

    /// The value (or the input key) is nested deeper than the configured limit.
    #[error("maximum nesting depth of {0} exceeded")]
    DepthLimit(usize),

    /// The sink did not accept the encoded payload.
    #[error("could not write encoded form: {0}")]
    Write(#[source] io::Error),

    /// The source could not be read.
    #[error("could not read form: {0}")]
    Read(#[source] io::Error),

    /// A scalar did not match the grammar of its destination.
    #[error("invalid value for `{key}`: {message}")]
    Parse { key: String, message: String },

    /// The shape of the input does not fit the destination.
    #[error("invalid structure at `{key}`: {message}")]
    Structural { key: String, message: String },

    /// Percent-decoded input (or a byte sequence) was not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] Utf8Error),

    /// The `Config` breaks one of its rules.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        Error::Unsupported(what.into())
    }

    pub(crate) fn parse(key: impl Into<String>, message: impl ToString) -> Self {
        Error::Parse {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn structural(key: impl Into<String>, message: impl ToString) -> Self {
        Error::Structural {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
