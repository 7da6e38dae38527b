pub mod descriptor;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::error::Error;
use crate::remote::{ConnectionError, RemoteError};
use crate::types::{CONNECTION_ERROR_CODE, ErrorCode, HANDLER_ERROR_CODE, WireError};
use descriptor::{Entry, ErrorType};

/// What [`Registry::register`] does when a code or type is already taken.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with [`Error::DuplicateCode`] or [`Error::DuplicateType`].
    #[default]
    Reject,
    /// Last registration wins.
    Replace,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
}

/// Maps error codes to constructors and error types back to their codes.
///
/// Built once at startup and then shared read-only (behind an `Arc` if
/// needed) by everything that turns wire envelopes into typed errors.
pub struct Registry {
    config: RegistryConfig,
    by_type: HashMap<TypeId, ErrorCode>,
    by_code: HashMap<ErrorCode, Entry>,
}

impl Registry {
    /// Empty registry holding only the [`ConnectionError`] sentinel at
    /// [`CONNECTION_ERROR_CODE`].
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let mut by_code = HashMap::new();
        by_code.insert(
            CONNECTION_ERROR_CODE,
            ErrorType::<ConnectionError>::new().into_entry(),
        );
        Self {
            config,
            by_type: HashMap::new(),
            by_code,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn register<T: RemoteError>(
        &mut self,
        code: impl Into<ErrorCode>,
        error_type: ErrorType<T>,
    ) -> Result<(), Error> {
        let code = code.into();
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if code == CONNECTION_ERROR_CODE {
            return Err(Error::ReservedCode { code });
        }
        if self.config.duplicate_policy == DuplicatePolicy::Reject {
            if self.by_code.contains_key(&code) {
                return Err(Error::DuplicateCode { code });
            }
            if let Some(&existing) = self.by_type.get(&type_id) {
                return Err(Error::DuplicateType {
                    type_name,
                    code: existing,
                });
            }
        }
        if !code.is_user() {
            tracing::warn!(%code, error_type = type_name, "registering error below first user code");
        }

        if let Some(previous) = self.by_code.insert(code, error_type.into_entry()) {
            tracing::warn!(
                %code,
                previous = previous.type_name,
                replacement = type_name,
                "replaced error registration"
            );
            if previous.type_id != type_id && self.by_type.get(&previous.type_id) == Some(&code) {
                self.by_type.remove(&previous.type_id);
            }
        }
        if let Some(previous_code) = self.by_type.insert(type_id, code)
            && previous_code != code
        {
            tracing::warn!(
                %code,
                %previous_code,
                error_type = type_name,
                "error type moved to a new code"
            );
            if self
                .by_code
                .get(&previous_code)
                .is_some_and(|entry| entry.type_id == type_id)
            {
                self.by_code.remove(&previous_code);
            }
        }

        tracing::debug!(%code, error_type = type_name, "registered error type");
        Ok(())
    }

    /// Code registered for `T`, if any.
    pub fn code_of<T: RemoteError>(&self) -> Option<ErrorCode> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    pub fn contains(&self, code: impl Into<ErrorCode>) -> bool {
        self.by_code.contains_key(&code.into())
    }

    /// Number of codes, the sentinel included.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Turns a received envelope into a typed error.
    ///
    /// Unknown codes never fail: the envelope itself is returned. A failing
    /// explicit constructor or [`WireCodec`](crate::WireCodec) surfaces as
    /// [`Error::Decode`].
    pub fn resolve(&self, wire: WireError) -> Result<Box<dyn RemoteError>, Error> {
        let Some(entry) = self.by_code.get(&wire.code) else {
            tracing::debug!(code = %wire.code, "unregistered error code, keeping wire error");
            return Ok(Box::new(wire));
        };

        entry.construct(&wire).map_err(|source| Error::Decode {
            code: wire.code,
            source: Box::new(source),
        })
    }

    /// Builds the outbound envelope for `err`.
    ///
    /// Unregistered types go out under [`HANDLER_ERROR_CODE`] with their
    /// display text as the message.
    pub fn encode(&self, err: &dyn RemoteError) -> Result<WireError, Error> {
        if let Some(wire) = err.downcast_ref::<WireError>() {
            return Ok(wire.clone());
        }

        let type_id = (err as &dyn Any).type_id();
        let registered = self.by_type.get(&type_id).copied();
        let code = registered.unwrap_or(HANDLER_ERROR_CODE);
        let entry = registered
            .and_then(|code| self.by_code.get(&code))
            .filter(|entry| entry.type_id == type_id);

        let Some(entry) = entry else {
            return Ok(WireError::new(code, err.to_string()));
        };

        if let Some(wire) = entry.to_wire(err) {
            return Ok(WireError { code, ..wire? });
        }

        let mut wire = WireError::new(code, err.to_string());
        if let Some(meta) = entry.encode_meta(err) {
            wire.meta = Some(meta?);
        }
        Ok(wire)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self
            .by_code
            .iter()
            .map(|(code, entry)| (*code, entry.type_name))
            .collect();
        codes.sort_unstable_by_key(|(code, _)| *code);
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("codes", &codes)
            .finish()
    }
}

impl WireError {
    /// Same as [`Registry::resolve`].
    pub fn resolve(self, registry: &Registry) -> Result<Box<dyn RemoteError>, Error> {
        registry.resolve(self)
    }
}
