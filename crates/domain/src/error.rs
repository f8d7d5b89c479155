use thiserror::Error;

use crate::hooks::HookName;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'{status}' response is missing '{field}'")]
    MissingField {
        status: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("unknown hook {0}")]
    Unregistered(HookName),
}
