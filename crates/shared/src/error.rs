use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body the server attaches to a rejected command, e.g.
/// `{"detail": "Detection already running"}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiRejection {
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Error)]
#[error("server rejected request ({status}): {detail}")]
pub struct ApiException {
    pub status: u16,
    pub detail: String,
}

impl From<(u16, ApiRejection)> for ApiException {
    fn from((status, rejection): (u16, ApiRejection)) -> Self {
        Self {
            status,
            detail: rejection.detail,
        }
    }
}
