//! Module: codec
//! Responsibility: map native JSON values to stored column text and back,
//! and decode the scalar text produced by path extraction.
//! Does not own: null policy (see `field`) or SQL parameter binding.

mod extract;


use serde_json::Value;
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use extract::{ScalarEncoding, encode_scalar, unwrap_extracted};

///
/// CONSTANTS
///

// Longest input excerpt quoted back in a deserialize error.
const ERROR_EXCERPT_CHARS: usize = 48;

///
/// CodecError
///
/// `Serialize` is raised at write time and aborts the write.
/// `Deserialize` is raised at read time and indicates stored data that is
/// not valid JSON; it is never coerced into a default.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CodecError {
    #[error("serialization failed for {context}: {message}")]
    Serialize { context: String, message: String },

    #[error("deserialization failed for {context}: {message} (input: {excerpt})")]
    Deserialize {
        context: String,
        message: String,
        excerpt: String,
    },
}

impl CodecError {
    pub(crate) fn serialize(message: impl fmt::Display) -> Self {
        Self::Serialize {
            context: "value".to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn deserialize(input: &str, message: impl fmt::Display) -> Self {
        Self::Deserialize {
            context: "value".to_string(),
            message: message.to_string(),
            excerpt: excerpt(input),
        }
    }

    /// Attach the storage column the failure belongs to.
    #[must_use]
    pub fn with_column(self, column: &str) -> Self {
        let context = format!("column '{column}'");
        match self {
            Self::Serialize { message, .. } => Self::Serialize { context, message },
            Self::Deserialize {
                message, excerpt, ..
            } => Self::Deserialize {
                context,
                message,
                excerpt,
            },
        }
    }

    #[must_use]
    pub const fn is_serialize(&self) -> bool {
        matches!(self, Self::Serialize { .. })
    }

    #[must_use]
    pub const fn is_deserialize(&self) -> bool {
        matches!(self, Self::Deserialize { .. })
    }
}

fn excerpt(input: &str) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(ERROR_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

///
/// Codec
///
/// Serialize/deserialize pair injected into a field at construction.
/// Implementations must round-trip every JSON-representable value to a
/// semantically equal value, even when the text form differs.
///

pub trait Codec: fmt::Debug + Send + Sync {
    fn serialize(&self, value: &Value) -> Result<String, CodecError>;

    fn deserialize(&self, text: &str) -> Result<Value, CodecError>;
}

///
/// JsonCodec
///
/// Standard JSON encoding via `serde_json`.
/// Object keys come out in sorted order because `serde_json::Map` is ordered.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JsonCodec {
    pub ensure_ascii: bool,
    pub pretty: bool,
}

impl JsonCodec {
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            ensure_ascii: false,
            pretty: false,
        }
    }

    #[must_use]
    pub const fn pretty() -> Self {
        Self {
            ensure_ascii: false,
            pretty: true,
        }
    }

    #[must_use]
    pub const fn with_ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.ensure_ascii = ensure_ascii;
        self
    }
}

impl Codec for JsonCodec {
    fn serialize(&self, value: &Value) -> Result<String, CodecError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(CodecError::serialize)?;

        Ok(if self.ensure_ascii {
            escape_non_ascii(&text)
        } else {
            text
        })
    }

    fn deserialize(&self, text: &str) -> Result<Value, CodecError> {
        serde_json::from_str(text).map_err(|err| CodecError::deserialize(text, err))
    }
}

// Structural JSON characters are all ASCII, so any non-ASCII char in the
// encoded text sits inside a string literal and may be escaped in place.
fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];

    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        for unit in ch.encode_utf16(&mut units) {
            out.push_str(&format!("\\u{unit:04x}"));
        }
    }

    out
}

///
/// DumpsFn / LoadsFn
///
/// Caller-supplied halves of a codec. Errors are reported as plain messages
/// and wrapped into `CodecError` by `FnCodec`.
///

pub type DumpsFn = Arc<dyn Fn(&Value) -> Result<String, String> + Send + Sync>;
pub type LoadsFn = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

///
/// FnCodec
///
/// Codec assembled from optional `dumps`/`loads` functions.
/// A missing half falls back to the base codec.
///

#[derive(Clone)]
pub struct FnCodec {
    dumps: Option<DumpsFn>,
    loads: Option<LoadsFn>,
    base: Arc<dyn Codec>,
}

impl FnCodec {
    #[must_use]
    pub fn new(dumps: Option<DumpsFn>, loads: Option<LoadsFn>, base: Arc<dyn Codec>) -> Self {
        Self { dumps, loads, base }
    }
}

impl fmt::Debug for FnCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec")
            .field("dumps", &self.dumps.as_ref().map(|_| "fn"))
            .field("loads", &self.loads.as_ref().map(|_| "fn"))
            .field("base", &self.base)
            .finish()
    }
}

impl Codec for FnCodec {
    fn serialize(&self, value: &Value) -> Result<String, CodecError> {
        match &self.dumps {
            Some(dumps) => dumps(value).map_err(CodecError::serialize),
            None => self.base.serialize(value),
        }
    }

    fn deserialize(&self, text: &str) -> Result<Value, CodecError> {
        match &self.loads {
            Some(loads) => loads(text).map_err(|message| CodecError::deserialize(text, message)),
            None => self.base.deserialize(text),
        }
    }
}
