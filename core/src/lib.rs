//! # rpc-core
//!
//! Error value for RPC failures, classified by a stable numeric code.
//!
//! ## Example
//!
//! ```rust
//! use rpc_core::{ErrorCode, RpcError};
//!
//! fn call(method: &str) -> Result<Vec<u8>, RpcError> {
//!     Err(RpcError::with_data(
//!         format!("Method \"{method}\" not found"),
//!         RpcError::METHOD_NOT_FOUND,
//!         method,
//!     ))
//! }
//!
//! let err = call("foo").unwrap_err();
//! assert_eq!(err.kind(), Some(ErrorCode::MethodNotFound));
//! ```

pub mod code;
pub mod error;
pub mod trace;

pub use code::{ErrorCode, ParseCodeError, CODES};
pub use error::{ErrorData, RpcError};
pub use trace::{Capture, Trace};
