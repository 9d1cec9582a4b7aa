//! Route worker for the Polyblog broker.
//!
//! A worker connects to the broker over a `ZeroMQ` REQ socket, registers the
//! route it serves, and then answers every request on that route with a
//! rendered page wrapped in an HTTP-shaped envelope.
//!
//! # Architecture
//!
//! ```text
//! broker --(request)--> RouteWorker --> PageRenderer
//!   ^                        |
//!   +--[route, status, headers, body]
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Environment configuration
//! - [`error`] -- Worker and render error types
//! - [`render`] -- Layout + content page rendering
//! - [`transport`] -- Broker connection and frame encoding
//! - [`worker`] -- Registration and the serve loop

pub mod config;
pub mod error;
pub mod render;
pub mod transport;
pub mod worker;

pub use config::{RenderFailurePolicy, ViewPaths, WorkerConfig};
pub use error::{RenderError, WorkerError};
pub use render::{PageRenderer, render_page};
pub use transport::BrokerConnection;
pub use worker::RouteWorker;
