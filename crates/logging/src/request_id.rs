//! # Request ID Tracking
//!
//! Utilities for generating and propagating request IDs across the
//! application. Request IDs are random UUIDs, accepted from an incoming
//! `x-request-id` header when one is present.

/// A request correlation ID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new random request ID.
    #[inline]
    pub fn new() -> Self { Self(uuid::Uuid::new_v4().to_string()) }

    /// Get the request ID as a string.
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }

    /// Consume and return the inner string.
    #[inline]
    pub fn into_string(self) -> String { self.0 }
}

impl Default for RequestId {
    #[inline]
    fn default() -> Self { Self::new() }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Try to get a request ID from a header value. Accepts any reasonable
/// opaque token so upstream proxies keep their own IDs.
pub fn try_from_header(value: &str) -> Option<RequestId> {
    let value = value.trim();
    if (8 ..= 128).contains(&value.len()) &&
        value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        Some(RequestId(value.to_string()))
    }
    else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_try_from_header() {
        let token = "3f6d1c2a-9b7e-4a1f-8c3d-2e5f6a7b8c9d";
        let result = try_from_header(token);
        assert_eq!(result.unwrap().as_str(), token);
    }

    #[test]
    fn test_try_from_header_invalid() {
        assert!(try_from_header("bad!@#").is_none());
        assert!(try_from_header("x").is_none());
    }
}
