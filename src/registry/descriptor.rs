use std::any::{TypeId, type_name};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::Error;
use crate::remote::{Constructor, RemoteError, WireCodec};
use crate::types::WireError;

type ConstructFn = Box<
    dyn Fn(&str, Option<&RawValue>, Option<&RawValue>) -> Result<Box<dyn RemoteError>, Error>
        + Send
        + Sync,
>;
type FromWireFn = Box<dyn Fn(&WireError) -> Result<Box<dyn RemoteError>, Error> + Send + Sync>;
type ToWireFn = Box<dyn Fn(&dyn RemoteError) -> Option<Result<WireError, Error>> + Send + Sync>;
type EncodeMetaFn =
    Box<dyn Fn(&dyn RemoteError) -> Option<Result<Box<RawValue>, Error>> + Send + Sync>;

struct MetaHooks<T> {
    decode: fn(&str) -> Result<T, serde_json::Error>,
    encode: fn(&T) -> Result<Box<RawValue>, serde_json::Error>,
}

struct WireHooks<T> {
    from_wire: fn(&WireError) -> Result<T, Error>,
    to_wire: fn(&T) -> Result<WireError, Error>,
}

/// Describes how a concrete error type `T` is rebuilt from an envelope.
///
/// Capabilities are opted into here, with the trait bounds checked at compile
/// time:
///
/// * [`with_constructor`](Self::with_constructor): an explicit
///   `(message, data, meta)` constructor replaces the default one.
/// * [`with_meta`](Self::with_meta): the default constructor decodes a
///   non-empty `meta` payload with serde. Decode failures are ignored and the
///   instance stays at `T::default()`; use `#[serde(default)]` on `T` to
///   allow partial payloads.
/// * [`with_wire`](Self::with_wire): [`WireCodec`] sees the whole envelope and
///   takes precedence over every other path.
///
/// The default constructor never copies the wire `message` into `T`.
pub struct ErrorType<T> {
    zero: fn() -> T,
    constructor: Option<Box<Constructor<T>>>,
    meta: Option<MetaHooks<T>>,
    wire: Option<WireHooks<T>>,
}

impl<T: RemoteError + Default> ErrorType<T> {
    pub fn new() -> Self {
        Self {
            zero: T::default,
            constructor: None,
            meta: None,
            wire: None,
        }
    }
}

impl<T: RemoteError + Default> Default for ErrorType<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RemoteError> ErrorType<T> {
    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&str, Option<&RawValue>, Option<&RawValue>) -> Result<T, Error>
            + Send
            + Sync
            + 'static,
    {
        let constructor: Box<Constructor<T>> = Box::new(constructor);
        self.constructor = Some(constructor);
        self
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn has_meta(&self) -> bool {
        self.meta.is_some()
    }

    pub fn has_wire(&self) -> bool {
        self.wire.is_some()
    }

    pub(crate) fn into_entry(self) -> Entry {
        let Self {
            zero,
            constructor,
            meta,
            wire,
        } = self;

        let encode_meta: Option<EncodeMetaFn> = meta.as_ref().map(|hooks| {
            let encode = hooks.encode;
            Box::new(move |err: &dyn RemoteError| {
                err.downcast_ref::<T>()
                    .map(|value| encode(value).map_err(Error::from))
            }) as EncodeMetaFn
        });

        let construct: ConstructFn = match constructor {
            Some(constructor) => Box::new(
                move |message: &str, data: Option<&RawValue>, meta: Option<&RawValue>| {
                    constructor(message, data, meta)
                        .map(|value| Box::new(value) as Box<dyn RemoteError>)
                },
            ),
            None => {
                let decode = meta.map(|hooks| hooks.decode);
                Box::new(
                    move |_message: &str, _data: Option<&RawValue>, meta: Option<&RawValue>| {
                        let value = default_instance(zero, decode, meta);
                        Ok::<_, Error>(Box::new(value) as Box<dyn RemoteError>)
                    },
                )
            }
        };

        let (from_wire, to_wire) = match wire {
            Some(WireHooks { from_wire, to_wire }) => (
                Some(Box::new(move |wire: &WireError| {
                    from_wire(wire).map(|value| Box::new(value) as Box<dyn RemoteError>)
                }) as FromWireFn),
                Some(Box::new(move |err: &dyn RemoteError| {
                    err.downcast_ref::<T>().map(to_wire)
                }) as ToWireFn),
            ),
            None => (None, None),
        };

        Entry {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            construct,
            from_wire,
            to_wire,
            encode_meta,
        }
    }
}

impl<T: RemoteError + Serialize + DeserializeOwned> ErrorType<T> {
    pub fn with_meta(mut self) -> Self {
        self.meta = Some(MetaHooks {
            decode: |meta| serde_json::from_str(meta),
            encode: |value| serde_json::value::to_raw_value(value),
        });
        self
    }
}

impl<T: RemoteError + WireCodec> ErrorType<T> {
    pub fn with_wire(mut self) -> Self {
        self.wire = Some(WireHooks {
            from_wire: T::from_wire,
            to_wire: T::to_wire,
        });
        self
    }
}

fn default_instance<T>(
    zero: fn() -> T,
    decode: Option<fn(&str) -> Result<T, serde_json::Error>>,
    meta: Option<&RawValue>,
) -> T {
    let (Some(decode), Some(meta)) = (decode, meta) else {
        return zero();
    };
    match decode(meta.get()) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(
                error_type = type_name::<T>(),
                error = %e,
                "ignoring undecodable meta payload"
            );
            zero()
        }
    }
}

/// Type-erased registration stored in the registry's code table.
pub(crate) struct Entry {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    construct: ConstructFn,
    from_wire: Option<FromWireFn>,
    to_wire: Option<ToWireFn>,
    encode_meta: Option<EncodeMetaFn>,
}

impl Entry {
    pub(crate) fn construct(&self, wire: &WireError) -> Result<Box<dyn RemoteError>, Error> {
        if let Some(from_wire) = &self.from_wire {
            return from_wire(wire);
        }
        (self.construct)(&wire.message, wire.data(), wire.meta())
    }

    pub(crate) fn to_wire(&self, err: &dyn RemoteError) -> Option<Result<WireError, Error>> {
        self.to_wire.as_ref().and_then(|to_wire| to_wire(err))
    }

    pub(crate) fn encode_meta(
        &self,
        err: &dyn RemoteError,
    ) -> Option<Result<Box<RawValue>, Error>> {
        self.encode_meta.as_ref().and_then(|encode| encode(err))
    }
}
