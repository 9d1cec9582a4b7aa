//! Route worker: registration handshake and the serve loop.
//!
//! Startup generates a fresh [`WorkerIdentity`], connects to the broker, and
//! sends the registration frame exactly once. The worker then alternates
//! forever between three phases:
//!
//! 1. Await a request (blocking, no timeout)
//! 2. Render the page
//! 3. Send the four-frame envelope
//!
//! Requests are handled strictly one at a time, so responses leave in the
//! order requests arrived. Nothing survives from one iteration to the next.

use std::future::Future;

use polyblog_types::{Envelope, Request, RouteId, WorkerIdentity};
use tracing::{debug, info, warn};

use crate::config::{RenderFailurePolicy, WorkerConfig};
use crate::error::WorkerError;
use crate::render::PageRenderer;
use crate::transport::BrokerConnection;

/// A registered worker answering one route.
#[derive(Debug)]
pub struct RouteWorker {
    route: RouteId,
    identity: WorkerIdentity,
    renderer: PageRenderer,
    connection: BrokerConnection,
    render_failure: RenderFailurePolicy,
    /// Responses sent since registration.
    served: u64,
}

impl RouteWorker {
    /// Connect to the broker and register the configured route.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Connection`] if the broker cannot be reached
    /// and [`WorkerError::Transport`] if the registration frame cannot be
    /// sent.
    pub async fn start(config: &WorkerConfig) -> Result<Self, WorkerError> {
        let identity = WorkerIdentity::generate();
        let mut connection = BrokerConnection::connect(
            &config.broker_url,
            identity,
            config.connect_timeout,
            config.send_timeout,
        )
        .await?;
        connection.register(&config.route).await?;

        info!(route = %config.route, identity = %identity, "responder ready");

        Ok(Self {
            route: config.route.clone(),
            identity,
            renderer: PageRenderer::new(config.views.clone()),
            connection,
            render_failure: config.render_failure,
            served: 0,
        })
    }

    /// Route this worker registered with.
    pub const fn route(&self) -> &RouteId {
        &self.route
    }

    /// Socket identity generated at startup.
    pub const fn identity(&self) -> WorkerIdentity {
        self.identity
    }

    /// Number of responses sent so far.
    pub const fn served(&self) -> u64 {
        self.served
    }

    /// Serve requests until an error occurs.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: any transport failure, and render
    /// failures under [`RenderFailurePolicy::Fatal`]. The loop never ends
    /// otherwise.
    pub async fn run(self) -> Result<(), WorkerError> {
        self.run_until(std::future::pending()).await
    }

    /// Serve requests until `shutdown` resolves or an error occurs.
    ///
    /// Shutdown is only observed while waiting for a request; a request that
    /// has been received is always answered first.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), WorkerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(route = %self.route, identity = %self.identity(), "awaiting requests");

        loop {
            let request = tokio::select! {
                () = &mut shutdown => {
                    info!(route = %self.route, served = self.served, "shutdown requested, worker stopping");
                    return Ok(());
                }
                received = self.connection.recv_request() => received?,
            };
            self.respond(&request).await?;
        }
    }

    async fn respond(&mut self, request: &Request) -> Result<(), WorkerError> {
        debug!(
            route = %self.route,
            payload_size = request.len(),
            "received request"
        );

        let envelope = self.build_envelope()?;
        let status = envelope.status;
        self.connection.send_envelope(envelope).await?;
        self.served = self.served.saturating_add(1);

        debug!(
            route = %self.route,
            status = %status,
            served = self.served,
            "response sent"
        );
        Ok(())
    }

    fn build_envelope(&self) -> Result<Envelope, WorkerError> {
        match self.renderer.render() {
            Ok(body) => Ok(Envelope::html(self.route.clone(), body)),
            Err(e) => match self.render_failure {
                RenderFailurePolicy::Fatal => Err(e.into()),
                RenderFailurePolicy::Respond => {
                    warn!(route = %self.route, error = %e, "render failed, answering 500");
                    Ok(Envelope::internal_error(self.route.clone()))
                }
            },
        }
    }
}
