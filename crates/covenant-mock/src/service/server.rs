//! TCP lifecycle for the mock service.
//!
//! Binds a listener, serves each accepted connection on its own task, and
//! shuts down on a broadcast signal. Everything request-scoped lives in
//! [`super::handler`]; this module only owns accept/spawn/shutdown.

use super::core::MockService;
use super::handler::handle_mock_request;
use super::types::MockError;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// A running mock provider service.
pub struct MockServer {
    service: Arc<MockService>,
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
}

impl MockServer {
    /// Bind and start serving. Port 0 asks the OS for a free port; the
    /// assigned address is available from [`MockServer::addr`].
    pub async fn start(service: MockService, host: &str, port: u16) -> Result<Self, MockError> {
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|source| MockError::Bind {
                host: host.to_string(),
                port,
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| MockError::Bind {
            host: host.to_string(),
            port,
            source,
        })?;
        info!(%addr, "mock service listening");

        let service = Arc::new(service);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let accept_service = Arc::clone(&service);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, client_addr)) => {
                                let service = Arc::clone(&accept_service);
                                tokio::spawn(async move {
                                    let io = TokioIo::new(stream);
                                    let handler = service_fn(move |req| {
                                        let service = Arc::clone(&service);
                                        async move {
                                            handle_mock_request(req, service, client_addr).await
                                        }
                                    });
                                    if let Err(e) = http1::Builder::new()
                                        .serve_connection(io, handler)
                                        .await
                                    {
                                        debug!("connection error: {e}");
                                    }
                                });
                            }
                            Err(e) => {
                                error!("accept error: {e}");
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!(%addr, "mock service shutting down");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            service,
            addr,
            shutdown_tx,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the running service.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn service(&self) -> &Arc<MockService> {
        &self.service
    }

    /// Signal the accept loop to stop. In-flight connections finish on their
    /// own tasks.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
