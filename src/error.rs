use crate::types::ErrorCode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error code {code} is already registered")]
    DuplicateCode { code: ErrorCode },

    #[error("error type {type_name} is already registered under code {code}")]
    DuplicateType {
        type_name: &'static str,
        code: ErrorCode,
    },

    #[error("error code {code} is reserved")]
    ReservedCode { code: ErrorCode },

    #[error("parse error: {reason}")]
    Parse { reason: String },

    #[error("failed to decode error code {code}: {source}")]
    Decode {
        code: ErrorCode,
        #[source]
        source: Box<Error>,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
