//! Route identifiers and worker identities.
//!
//! A [`RouteId`] is the dispatch key the broker uses to reach a worker; it
//! is chosen at startup and never renegotiated. A [`WorkerIdentity`] is the
//! random token bound to the worker's socket so the broker can address it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a route identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteIdError {
    /// The identifier was empty or only whitespace.
    #[error("route identifier must not be empty")]
    Empty,
}

/// Opaque name of a logical endpoint, e.g. `GET/_/post/new`.
///
/// The worker never interprets the contents; the broker matches it
/// byte-for-byte against incoming requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteId(String);

impl RouteId {
    /// Build a route identifier, rejecting blank input.
    pub fn new(route: impl Into<String>) -> Result<Self, RouteIdError> {
        let route = route.into();
        if route.trim().is_empty() {
            return Err(RouteIdError::Empty);
        }
        Ok(Self(route))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RouteId {
    type Error = RouteIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RouteId> for String {
    fn from(route: RouteId) -> Self {
        route.0
    }
}

impl core::str::FromStr for RouteId {
    type Err = RouteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl core::fmt::Display for RouteId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-unique socket identity, a random UUID v4.
///
/// Generated once when the worker starts and held for the lifetime of its
/// connection. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerIdentity(Uuid);

impl WorkerIdentity {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Bytes sent to the transport as the socket identity (hyphenated UUID).
    pub fn to_wire(self) -> Vec<u8> {
        self.0.hyphenated().to_string().into_bytes()
    }
}

impl core::fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
