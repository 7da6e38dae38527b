#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod error;
pub mod registry;
pub mod remote;
pub mod types;

pub use error::Error;
pub use registry::descriptor::ErrorType;
pub use registry::{DuplicatePolicy, Registry, RegistryConfig};
pub use remote::{ConnectionError, Constructor, RemoteError, WireCodec};
pub use types::{
    CONNECTION_ERROR_CODE, ErrorCode, FIRST_USER_CODE, HANDLER_ERROR_CODE, WireError,
};
