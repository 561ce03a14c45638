//! HttpServer: a running axum server as a lifecycle resource.

use std::path::PathBuf;
use std::sync::Arc;

use axum::handler::Handler;
use axum::serve::Listener;
use axum::Router;
use hostio_core::{BridgeError, BridgeResult};
use hostio_lifecycle::{
    CompletionCell, CompletionFuture, HandleState, ProcessContext, ResourceHandle, ResourceKind,
};
use serde::{Deserialize, Serialize};

use crate::addr::{Addr, NetAddr, UnixAddr, UnixTransport};

/// Where to listen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum ServeOptions {
    /// Missing fields fall back to `server.hostname` / `server.port`.
    Tcp {
        hostname: Option<String>,
        port: Option<u16>,
    },
    Unix {
        path: PathBuf,
        #[serde(default)]
        packet: bool,
    },
    Vsock {
        cid: u32,
        port: u32,
    },
}

impl ServeOptions {
    pub fn tcp(hostname: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            hostname: Some(hostname.into()),
            port: Some(port),
        }
    }

    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self::Unix {
            path: path.into(),
            packet: false,
        }
    }
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self::Tcp {
            hostname: None,
            port: None,
        }
    }
}

/// A running HTTP server.
///
/// Ref'd by default. `shutdown` stops accepting, drains in-flight requests
/// and resolves once [`finished`](Self::finished) has settled. If the
/// server stops on its own the handle closes itself.
pub struct HttpServer {
    state: Arc<HandleState>,
    addr: Addr,
    finished: CompletionCell<()>,
}

/// Serve every request with `handler`.
pub async fn serve<H, T>(
    ctx: &ProcessContext,
    options: ServeOptions,
    handler: H,
) -> BridgeResult<HttpServer>
where
    H: Handler<T, ()>,
    T: 'static,
{
    serve_router(ctx, options, Router::new().fallback(handler)).await
}

/// Serve a prepared router.
pub async fn serve_router(
    ctx: &ProcessContext,
    options: ServeOptions,
    router: Router,
) -> BridgeResult<HttpServer> {
    match options {
        ServeOptions::Tcp { hostname, port } => {
            let config = &ctx.config().server;
            let hostname = hostname.unwrap_or_else(|| config.effective_hostname().to_string());
            let port = port.unwrap_or_else(|| config.effective_port());
            let listener = tokio::net::TcpListener::bind((hostname.as_str(), port))
                .await
                .map_err(|e| BridgeError::from_io("serve", e))?;
            let local = listener
                .local_addr()
                .map_err(|e| BridgeError::from_io("serve", e))?;
            Ok(start(ctx, listener, Addr::Net(NetAddr::tcp(local)), router))
        }
        #[cfg(unix)]
        ServeOptions::Unix { path, packet } => {
            if packet {
                return Err(BridgeError::invalid_argument(
                    "serve",
                    "HTTP cannot be served over unixpacket sockets",
                ));
            }
            let listener = tokio::net::UnixListener::bind(&path)
                .map_err(|e| BridgeError::from_io("serve", e))?;
            let addr = Addr::Unix(UnixAddr {
                transport: UnixTransport::Unix,
                path,
            });
            Ok(start(ctx, listener, addr, router))
        }
        #[cfg(not(unix))]
        ServeOptions::Unix { .. } => Err(BridgeError::invalid_argument(
            "serve",
            "unix sockets are not supported on this platform",
        )),
        ServeOptions::Vsock { .. } => Err(BridgeError::invalid_argument(
            "serve",
            "vsock transport is not supported",
        )),
    }
}

fn start<L>(ctx: &ProcessContext, listener: L, addr: Addr, router: Router) -> HttpServer
where
    L: Listener,
    L::Addr: std::fmt::Debug,
{
    let state = Arc::new(HandleState::new(ResourceKind::Server, ctx.keep_alive()));
    let finished = CompletionCell::new();
    tracing::debug!(resource = %state.label(), addr = %addr, "server listening");

    let shutdown = state.close_token();
    let task_state = Arc::clone(&state);
    let task_finished = finished.clone();
    tokio::spawn(async move {
        let outcome = axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.aborted().await })
            .await
            .map_err(|e| BridgeError::from_io("serve", e));
        if let Err(err) = &outcome {
            tracing::error!(resource = %task_state.label(), error = %err, "server failed");
        }
        task_state.begin_close();
        task_finished.settle(outcome);
        tracing::debug!(resource = %task_state.label(), "server finished");
    });

    HttpServer {
        state,
        addr,
        finished,
    }
}

impl HttpServer {
    /// The bound address. For TCP port 0 this holds the assigned port.
    pub fn addr(&self) -> &Addr {
        &self.addr
    }

    /// Settles once the server has stopped for good.
    pub fn finished(&self) -> CompletionFuture<()> {
        self.finished.future()
    }

    /// Stop accepting, drain in-flight requests and wait until finished.
    /// Calling it again returns the stored outcome.
    pub async fn shutdown(&self) -> BridgeResult<()> {
        self.close()?;
        self.finished.future().wait().await
    }
}

impl ResourceHandle for HttpServer {
    fn state(&self) -> &HandleState {
        &self.state
    }

    fn close_native(&self) -> BridgeResult<()> {
        // The close token drives graceful shutdown; nothing else to release.
        Ok(())
    }
}
