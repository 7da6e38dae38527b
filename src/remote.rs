use std::any::Any;
use std::fmt;

use serde_json::value::RawValue;

use crate::error::Error;
use crate::types::WireError;

/// An application error that can travel across the wire.
///
/// Resolution hands back a `Box<dyn RemoteError>`; use [`is`](#method.is) or
/// [`downcast_ref`](#method.downcast_ref) to recover the concrete type, and
/// [`error_data`](RemoteError::error_data) to inspect extra payloads without
/// knowing it.
pub trait RemoteError: std::error::Error + Any + Send + Sync + 'static {
    /// Extra data explaining the error, if the type carries any.
    fn error_data(&self) -> Option<&dyn Any> {
        None
    }
}

impl dyn RemoteError {
    pub fn is<T: RemoteError>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    pub fn downcast_ref<T: RemoteError>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Shorthand for downcasting [`error_data`](RemoteError::error_data).
    pub fn error_data_as<D: Any>(&self) -> Option<&D> {
        self.error_data()?.downcast_ref::<D>()
    }
}

/// Exposes the raw `data` payload as a `Box<RawValue>`.
impl RemoteError for WireError {
    fn error_data(&self) -> Option<&dyn Any> {
        self.data.as_ref().map(|data| data as &dyn Any)
    }
}

/// Conversion between an error type and the whole wire envelope.
///
/// Implementors see `message`, `data` and `meta` at once. When registered with
/// [`ErrorType::with_wire`](crate::ErrorType::with_wire) this path wins over
/// any explicit constructor. The `code` returned by `to_wire` is replaced by
/// the registered one. Malformed envelopes are reported as
/// [`Error::Parse`] or, for serde failures, [`Error::Json`].
pub trait WireCodec: Sized {
    fn from_wire(wire: &WireError) -> Result<Self, Error>;

    fn to_wire(&self) -> Result<WireError, Error>;
}

/// Signature of an explicit constructor: `(message, data, meta)`.
pub type Constructor<T> =
    dyn Fn(&str, Option<&RawValue>, Option<&RawValue>) -> Result<T, Error> + Send + Sync;

/// Transport-level failure surfaced through the same path as remote errors.
///
/// `source()` is `None` unless a transport error was wrapped with [`new`](Self::new).
#[derive(Default)]
pub struct ConnectionError {
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConnectionError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }
}

impl fmt::Debug for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionError")
            .field("source", &self.source.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{source}"),
            None => f.write_str("RPCConnectionError"),
        }
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(source) => Some(source.as_ref() as &(dyn std::error::Error + 'static)),
            None => None,
        }
    }
}

impl RemoteError for ConnectionError {}
