//! HTTP wrapper around the pipeline (feature `service`).
//!
//! `POST /extend-canvas` takes a JSON body with an image URL or base64 bytes plus the
//! same parameters as the CLI, runs the transform once on tokio's blocking pool and
//! answers with the base64 result or `{ success: false, error: { kind, message } }`.
//! `GET /health` answers `{"status":"ok"}`. Concurrency is bounded by a semaphore.
//! The same wall-clock timeout bounds reading a request and running it.
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod source;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use handler::{ExtendCanvasRequest, ExtendCanvasResponse};

use handler::{ErrorBody, handle_extend_canvas};
use http::{Request, Response, read_request, write_response};

/// State shared by every connection task.
#[derive(Debug)]
pub struct AppState {
    pub config: ServiceConfig,
    pub client: reqwest::Client,
    pub permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        let client = source::build_client(&config)?;
        let permits = Arc::new(Semaphore::new(config.max_concurrency));
        Ok(Self {
            config,
            client,
            permits,
        })
    }
}

fn error_response(err: &ServiceError) -> Response {
    Response::json(err.status(), &ErrorBody::from(err))
}

/// Dispatch one parsed request.
pub async fn route(state: &Arc<AppState>, request: Request) -> Response {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/extend-canvas") => match handle_extend_canvas(state, &request.body).await {
            Ok(body) => Response::json(200, &body),
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Extend request failed");
                error_response(&e)
            }
        },
        ("GET", "/health") => Response::json(200, &serde_json::json!({ "status": "ok" })),
        (method, path @ ("/extend-canvas" | "/health")) => {
            error_response(&ServiceError::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            })
        }
        (_, path) => error_response(&ServiceError::NotFound(path.to_string())),
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    state: Arc<AppState>,
) -> Result<(), ServiceError> {
    let timeout_secs = state.config.request_timeout_secs;
    let read = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        read_request(&mut stream, state.config.max_body_bytes),
    )
    .await
    .unwrap_or_else(|_| Err(ServiceError::RequestTimeout(timeout_secs)));
    let response = match read {
        Ok(Some(request)) => {
            debug!(%peer, method = %request.method, path = %request.path, bytes = request.body.len(), "Request");
            route(&state, request).await
        }
        Ok(None) => return Ok(()),
        Err(e) => {
            warn!(%peer, error = %e, "Rejected request");
            error_response(&e)
        }
    };
    write_response(&mut stream, &response).await?;
    debug!(%peer, status = response.status, bytes = response.body.len(), "Response sent");
    Ok(())
}

/// Bound listener plus shared state; call [`Server::run_until`] to serve.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    pub async fn bind(config: ServiceConfig) -> Result<Self, ServiceError> {
        let state = AppState::new(config)?;
        let listener = TcpListener::bind(state.config.bind).await?;
        info!(
            addr = %listener.local_addr()?,
            max_concurrency = state.config.max_concurrency,
            timeout_secs = state.config.request_timeout_secs,
            temp_dir = ?state.config.temp_dir,
            "Service listening"
        );
        Ok(Self {
            listener,
            state: Arc::new(state),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves. Each connection gets its own task.
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, state).await {
                                warn!(%peer, error = %e, "Connection handler error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "Failed to accept connection"),
                },
            }
        }
    }
}
