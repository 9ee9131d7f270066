//! Stable numeric codes carried by [`RpcError`](crate::RpcError).
//!
//! The table is a constant: every caller sees the same four names, and a
//! copy taken with `let mut t = CODES;` can be changed without touching
//! later lookups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An internal invariant/assertion failed.
pub const ASSERT: i32 = -90009;
/// The received payload is not a valid RPC envelope.
pub const INVALID_JSONRPC: i32 = -99998;
/// The requested method does not exist. Same value as the JSON-RPC reserved code.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// No specific code was supplied.
pub const UNKNOWN: i32 = -99999;

/// Symbolic name to code.
pub const CODES: [(&str, i32); 4] = [
    ("ASSERT", ASSERT),
    ("INVALID_JSONRPC", INVALID_JSONRPC),
    ("METHOD_NOT_FOUND", METHOD_NOT_FOUND),
    ("UNKNOWN", UNKNOWN),
];

/// Find a code by its table name.
pub fn lookup(name: &str) -> Option<i32> {
    CODES
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, code)| *code)
}

/// Named entries of [`CODES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// An internal invariant/assertion failed
    Assert,
    /// Payload is not a valid RPC envelope
    InvalidJsonrpc,
    /// Remote method does not exist
    MethodNotFound,
    /// No specific code supplied
    Unknown,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 4] = [
        ErrorCode::Assert,
        ErrorCode::InvalidJsonrpc,
        ErrorCode::MethodNotFound,
        ErrorCode::Unknown,
    ];

    pub const fn code(self) -> i32 {
        match self {
            Self::Assert => ASSERT,
            Self::InvalidJsonrpc => INVALID_JSONRPC,
            Self::MethodNotFound => METHOD_NOT_FOUND,
            Self::Unknown => UNKNOWN,
        }
    }

    /// Table name, e.g. `"METHOD_NOT_FOUND"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Assert => "ASSERT",
            Self::InvalidJsonrpc => "INVALID_JSONRPC",
            Self::MethodNotFound => "METHOD_NOT_FOUND",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// The named entry for `code`, or `None` for ad-hoc codes.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code name: {name}")]
pub struct ParseCodeError {
    pub name: String,
}

impl FromStr for ErrorCode {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseCodeError {
                name: s.to_string(),
            })
    }
}

impl From<ErrorCode> for i32 {
    fn from(kind: ErrorCode) -> Self {
        kind.code()
    }
}
