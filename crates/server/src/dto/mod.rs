//! # Data Transfer Objects
//!
//! Request and response types for the API. Requests carry `validator`
//! annotations and are validated before any handler logic runs; responses
//! are built from entity models at the boundary.

pub mod evaluations;
pub mod events;
pub mod teams;
pub mod users;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializer for patch fields where JSON `null` clears the value and an
/// absent field leaves it untouched. Used with `#[serde(default)]` so a
/// missing field stays `None` while an explicit `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Generic success acknowledgement for endpoints with no payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}
