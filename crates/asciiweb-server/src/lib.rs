//! # asciiweb Server
//!
//! HTTP front end for the banner engine. Each connection is handled on its
//! own tokio task and carries exactly one request.
//!
//! ```text
//!   browser ──POST /ascii-art──▶ read_request ──▶ App::handle
//!                                                   │
//!                                   spawn_blocking(render) ──▶ template
//! ```

pub mod error;
pub mod form;
pub mod http;
pub mod routes;
pub mod template;

pub use error::{Result, ServerError};
pub use http::{Method, Request, Response};
pub use routes::App;
pub use template::PageTemplate;

use asciiweb_config::Config;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

/// A bound server, ready to accept connections
pub struct Server {
    listener: TcpListener,
    app: Arc<App>,
    max_request_bytes: usize,
}

impl Server {
    /// Bind to the configured address
    pub async fn bind(config: &Config) -> Result<Self> {
        let listener = TcpListener::bind(config.server.listen).await?;
        Ok(Self::from_listener(
            listener,
            App::from_config(config),
            config.server.max_request_bytes,
        ))
    }

    /// Serve `app` on an existing listener
    pub fn from_listener(listener: TcpListener, app: App, max_request_bytes: usize) -> Self {
        Self {
            listener,
            app: Arc::new(app),
            max_request_bytes,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` completes
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Listening on http://{}", self.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let app = Arc::clone(&self.app);
                        let max = self.max_request_bytes;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, app, max).await {
                                tracing::debug!("Connection from {} failed: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => tracing::warn!("Failed to accept connection: {}", e),
                },
            }
        }
    }
}

/// Read one request from `stream`, answer it and close
pub async fn handle_connection<S>(mut stream: S, app: Arc<App>, max_request_bytes: usize) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (response, include_body) = match http::read_request(&mut stream, max_request_bytes).await {
        Ok(request) => {
            let span = tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method,
                path = %request.path,
            );
            let include_body = request.method != Method::Head;
            let response = app.handle(request).instrument(span.clone()).await;
            span.in_scope(|| tracing::info!(status = response.status, "Handled request"));
            (response, include_body)
        }
        Err(ServerError::ConnectionClosed) => return Ok(()),
        Err(e @ ServerError::RequestTooLarge(_)) => {
            tracing::warn!("{}", e);
            (Response::error(413), true)
        }
        Err(e @ ServerError::MalformedRequest(_)) => {
            tracing::warn!("{}", e);
            (Response::error(400), true)
        }
        Err(e) => return Err(e),
    };

    stream.write_all(&response.to_bytes(include_body)).await?;
    stream.shutdown().await?;
    Ok(())
}
