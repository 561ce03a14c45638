//! HTTP server bindings. Requests are handed to a JS handler whose return
//! value becomes the plain-text response body.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hostio_lifecycle::{ResourceHandle, ResourceId};
use hostio_net::{serve, text, HttpServer, ServeOptions};
use napi::threadsafe_function::{ErrorStrategy, ThreadsafeFunction, ThreadsafeFunctionCallMode};
use napi_derive::napi;
use tokio::sync::oneshot;

use crate::conversions::error_codes::to_napi_error;
use crate::conversions::types::JsRequest;
use crate::conversions::{from_json, to_json};
use crate::runtime;

/// Largest request body forwarded to JS.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

type JsHandler = ThreadsafeFunction<JsRequest, ErrorStrategy::Fatal>;

async fn respond(handler: Arc<JsHandler>, req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let body = match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => return (StatusCode::PAYLOAD_TOO_LARGE, err.to_string()).into_response(),
    };

    let (tx, rx) = oneshot::channel::<String>();
    let request = JsRequest {
        method,
        path,
        query,
        body,
    };
    handler.call_with_return_value(
        request,
        ThreadsafeFunctionCallMode::NonBlocking,
        move |reply: String| {
            let _ = tx.send(reply);
            Ok(())
        },
    );
    match rx.await {
        Ok(reply) => text(reply),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "handler did not reply").into_response(),
    }
}

#[napi]
pub struct HttpServerHandle {
    inner: Arc<HttpServer>,
    id: ResourceId,
}

/// Start serving. `options` is `{ transport: "tcp", hostname?, port? }`,
/// `{ transport: "unix", path }` or `{ transport: "vsock", cid, port }`;
/// omitted means TCP on the configured defaults.
#[napi]
pub async fn net_serve(
    options: Option<serde_json::Value>,
    handler: JsHandler,
) -> napi::Result<HttpServerHandle> {
    let rt = runtime::get()?;
    let options: ServeOptions = from_json("serve options", options)?;
    let handler = Arc::new(handler);
    let ctx = rt.ctx.clone();
    let server = rt
        .run("serve", async move {
            serve(&ctx, options, move |req: Request| {
                let handler = Arc::clone(&handler);
                async move { respond(handler, req).await }
            })
            .await
        })
        .await?;
    let inner = Arc::new(server);
    let id = rt.ctx.register(inner.clone());
    Ok(HttpServerHandle { inner, id })
}

#[napi]
impl HttpServerHandle {
    #[napi(getter)]
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// The bound address, e.g. `{ kind: "net", transport: "tcp", hostname, port }`.
    #[napi]
    pub fn addr(&self) -> napi::Result<serde_json::Value> {
        to_json("addr", self.inner.addr())
    }

    /// Resolves once the server has stopped for good.
    #[napi]
    pub async fn finished(&self) -> napi::Result<()> {
        let rt = runtime::get()?;
        let finished = self.inner.finished();
        rt.run("finished", async move { finished.wait().await })
            .await
    }

    /// Stop accepting, drain in-flight requests, then resolve.
    #[napi]
    pub async fn shutdown(&self) -> napi::Result<()> {
        let rt = runtime::get()?;
        let server = self.inner.clone();
        rt.run("shutdown", async move { server.shutdown().await })
            .await
    }

    #[napi]
    pub fn close(&self) -> napi::Result<()> {
        self.inner.close().map_err(to_napi_error)
    }
}
