//! Error type for RPC failures

use std::fmt;
use std::panic::Location;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::trace;

use crate::code::{self, ErrorCode};
use crate::trace::Trace;

/// Extra context attached by the raiser, e.g. the missing method name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorData {
    /// Integer or finite float
    Number(serde_json::Number),
    /// Free-form text
    Text(String),
}

impl ErrorData {
    /// `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(Self::Number)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            Self::Text(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ErrorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorData::Number(n) => write!(f, "{}", n),
            ErrorData::Text(t) => f.write_str(t),
        }
    }
}

impl From<&str> for ErrorData {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ErrorData {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

macro_rules! number_data {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ErrorData {
                fn from(value: $ty) -> Self {
                    Self::Number(value.into())
                }
            }
        )*
    };
}

number_data!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// A failed RPC operation.
///
/// `code` is the value to branch on; compare it with [`RpcError::CODES`]
/// or the constants in [`crate::code`]. Any `i32` is accepted, including
/// codes outside the table.
///
/// ```
/// use rpc_core::RpcError;
///
/// let err = RpcError::with_data("Method \"foo\" not found", RpcError::METHOD_NOT_FOUND, "foo");
/// assert_eq!(err.code(), -32601);
/// assert_eq!(err.data().and_then(|d| d.as_str()), Some("foo"));
/// ```
#[derive(Clone)]
pub struct RpcError {
    message: String,
    code: i32,
    data: Option<ErrorData>,
    trace: Trace,
}

impl RpcError {
    /// Value of [`RpcError::name`] for every instance.
    pub const NAME: &'static str = "RpcError";

    pub const CODES: [(&'static str, i32); 4] = code::CODES;

    pub const ASSERT: i32 = code::ASSERT;
    pub const INVALID_JSONRPC: i32 = code::INVALID_JSONRPC;
    pub const METHOD_NOT_FOUND: i32 = code::METHOD_NOT_FOUND;
    pub const UNKNOWN: i32 = code::UNKNOWN;

    #[track_caller]
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self::build(message.into(), code, None, Location::caller())
    }

    #[track_caller]
    pub fn with_data(message: impl Into<String>, code: i32, data: impl Into<ErrorData>) -> Self {
        Self::build(message.into(), code, Some(data.into()), Location::caller())
    }

    fn build(
        message: String,
        code: i32,
        data: Option<ErrorData>,
        caller: &'static Location<'static>,
    ) -> Self {
        trace!(
            event = "rpc_error.create",
            code,
            has_data = data.is_some(),
            caller = %caller,
            "rpc_error.create"
        );
        Self {
            message,
            code,
            data,
            trace: Trace::capture(caller),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn data(&self) -> Option<&ErrorData> {
        self.data.as_ref()
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// The table entry for this code, `None` for ad-hoc codes.
    pub fn kind(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    pub fn is(&self, kind: ErrorCode) -> bool {
        self.code == kind.code()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Human-readable trace, headed by the `Display` form.
    pub fn stack(&self) -> String {
        self.trace.render(&self.to_string())
    }
}

impl Default for RpcError {
    #[track_caller]
    fn default() -> Self {
        Self::build(String::new(), code::UNKNOWN, None, Location::caller())
    }
}

impl From<&str> for RpcError {
    #[track_caller]
    fn from(message: &str) -> Self {
        Self::build(message.to_string(), code::UNKNOWN, None, Location::caller())
    }
}

impl From<String> for RpcError {
    #[track_caller]
    fn from(message: String) -> Self {
        Self::build(message, code::UNKNOWN, None, Location::caller())
    }
}

impl From<ErrorCode> for RpcError {
    #[track_caller]
    fn from(kind: ErrorCode) -> Self {
        Self::build(String::new(), kind.code(), None, Location::caller())
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(Self::NAME)
        } else {
            write!(f, "{}: {}", Self::NAME, self.message)
        }
    }
}

// Trace stays out of debug dumps; use `stack()` for it.
impl fmt::Debug for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(Self::NAME)
            .field("code", &self.code)
            .field("data", &self.data)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl std::error::Error for RpcError {}

/// Only `code` and `data` are serialized.
impl Serialize for RpcError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.data.is_some() { 2 } else { 1 };
        let mut state = serializer.serialize_struct(Self::NAME, len)?;
        state.serialize_field("code", &self.code)?;
        if let Some(data) = &self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}
