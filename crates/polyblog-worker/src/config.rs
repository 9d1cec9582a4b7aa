//! Configuration types for the route worker.
//!
//! All configuration is loaded from environment variables. The worker needs
//! to know where the broker listens, which route it serves, which templates
//! make up the page, and how to react when rendering fails.

use std::path::PathBuf;
use std::time::Duration;

use polyblog_types::RouteId;

use crate::error::WorkerError;

/// Default broker endpoint.
pub const DEFAULT_BROKER_URL: &str = "tcp://localhost:4321";
/// Default route served by this worker.
pub const DEFAULT_ROUTE_ID: &str = "GET/_/post/new";
/// Default layout template.
pub const DEFAULT_LAYOUT_TEMPLATE: &str = "views/layout.html";
/// Default content template.
pub const DEFAULT_CONTENT_TEMPLATE: &str = "views/post.new.html";

/// Complete worker configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Broker endpoint (e.g. `tcp://localhost:4321`).
    pub broker_url: String,
    /// Route registered with the broker and echoed in every response.
    pub route: RouteId,
    /// Template references rendered for every request.
    pub views: ViewPaths,
    /// What to do when a page fails to render.
    pub render_failure: RenderFailurePolicy,
    /// Maximum time to establish the broker connection.
    pub connect_timeout: Duration,
    /// Maximum time a single send may take before it is treated as failed.
    pub send_timeout: Duration,
}

/// Layout and content template paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPaths {
    /// Outer layout; receives the rendered content as `content`.
    pub layout: PathBuf,
    /// Inner content template, rendered first.
    pub content: PathBuf,
}

/// Reaction to a [`RenderError`](crate::error::RenderError) in the serve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFailurePolicy {
    /// Propagate the error and stop the worker.
    Fatal,
    /// Answer with a `500` envelope and keep serving.
    Respond,
}

impl core::str::FromStr for RenderFailurePolicy {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "respond" => Ok(Self::Respond),
            other => Err(WorkerError::Config(format!(
                "unknown render failure policy: {other}"
            ))),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `BROKER_URL` -- broker endpoint (default `tcp://localhost:4321`)
    /// - `ROUTE_ID` -- route to serve (default `GET/_/post/new`)
    /// - `LAYOUT_TEMPLATE` -- layout path (default `views/layout.html`)
    /// - `CONTENT_TEMPLATE` -- content path (default `views/post.new.html`)
    /// - `RENDER_FAILURE` -- `fatal` or `respond` (default `fatal`)
    /// - `CONNECT_TIMEOUT_MS` -- connect deadline in milliseconds (default 10000)
    /// - `SEND_TIMEOUT_MS` -- per-send deadline in milliseconds (default 5000)
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WorkerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        let broker_url = var("BROKER_URL", DEFAULT_BROKER_URL);
        if !broker_url.contains("://") {
            return Err(WorkerError::Config(format!(
                "invalid BROKER_URL {broker_url}: expected transport://address"
            )));
        }

        let route: RouteId = var("ROUTE_ID", DEFAULT_ROUTE_ID)
            .parse()
            .map_err(|e| WorkerError::Config(format!("invalid ROUTE_ID: {e}")))?;

        let views = ViewPaths {
            layout: PathBuf::from(var("LAYOUT_TEMPLATE", DEFAULT_LAYOUT_TEMPLATE)),
            content: PathBuf::from(var("CONTENT_TEMPLATE", DEFAULT_CONTENT_TEMPLATE)),
        };

        let render_failure: RenderFailurePolicy = var("RENDER_FAILURE", "fatal").parse()?;

        let connect_timeout_ms: u64 = var("CONNECT_TIMEOUT_MS", "10000")
            .parse()
            .map_err(|e| WorkerError::Config(format!("invalid CONNECT_TIMEOUT_MS: {e}")))?;

        let send_timeout_ms: u64 = var("SEND_TIMEOUT_MS", "5000")
            .parse()
            .map_err(|e| WorkerError::Config(format!("invalid SEND_TIMEOUT_MS: {e}")))?;

        Ok(Self {
            broker_url,
            route,
            views,
            render_failure,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            send_timeout: Duration::from_millis(send_timeout_ms),
        })
    }
}
