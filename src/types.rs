use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::Error;

/// Codes below this value are reserved for errors defined by this crate.
pub const FIRST_USER_CODE: ErrorCode = ErrorCode(2);

/// Code stamped on outbound errors whose type was never registered.
pub const HANDLER_ERROR_CODE: ErrorCode = ErrorCode(1);

/// Out-of-band code of the built-in [`ConnectionError`](crate::ConnectionError) sentinel.
pub const CONNECTION_ERROR_CODE: ErrorCode = ErrorCode(-1_111_111);

/// Integer key distinguishing error kinds across the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i64);

impl ErrorCode {
    pub fn value(self) -> i64 {
        self.0
    }

    /// `true` for codes applications are expected to register.
    pub fn is_user(self) -> bool {
        self >= FIRST_USER_CODE
    }
}

impl From<i64> for ErrorCode {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for ErrorCode {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The `error` member of a JSON-RPC response as it arrives on the wire.
///
/// `data` and `meta` are kept as raw JSON until a registered error type
/// claims them. When no type is registered for `code`, the envelope itself is
/// the resolved error: it renders `message` and exposes the raw `data` through
/// [`RemoteError::error_data`](crate::RemoteError::error_data).
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct WireError {
    pub code: ErrorCode,
    pub message: String,
    /// Conventional JSON-RPC `error.data` payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
    /// Full structured encoding of the error type's own fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Box<RawValue>>,
}

impl WireError {
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
            meta: None,
        }
    }

    pub fn with_data<T: Serialize + ?Sized>(mut self, data: &T) -> Result<Self, Error> {
        self.data = Some(serde_json::value::to_raw_value(data)?);
        Ok(self)
    }

    pub fn with_meta<T: Serialize + ?Sized>(mut self, meta: &T) -> Result<Self, Error> {
        self.meta = Some(serde_json::value::to_raw_value(meta)?);
        Ok(self)
    }

    pub fn data(&self) -> Option<&RawValue> {
        self.data.as_deref()
    }

    pub fn meta(&self) -> Option<&RawValue> {
        self.meta.as_deref()
    }
}
