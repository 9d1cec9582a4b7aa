//! Shared type definitions for Polyblog route workers.
//!
//! A route worker registers a [`RouteId`] with the broker, identifies its
//! socket with a [`WorkerIdentity`], and answers every request with an
//! [`Envelope`]: an HTTP-shaped response carried as four string frames.
//!
//! # Modules
//!
//! - [`ids`] -- Route identifiers and per-process worker identities
//! - [`envelope`] -- Status codes, header blocks, and the response envelope
//! - [`post`] -- The persisted post record shape

pub mod envelope;
pub mod ids;
pub mod post;

// Re-export all public types at crate root for convenience.
pub use envelope::{Envelope, HeaderBlock, Request, StatusCode};
pub use ids::{RouteId, RouteIdError, WorkerIdentity};
pub use post::PostRecord;
