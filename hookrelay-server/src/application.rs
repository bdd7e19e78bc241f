// HTTP listener shared by the broker and the receiver

use crate::{HttpRequest, HttpResponse, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Turns a buffered request into a response
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(&self, request: HttpRequest) -> HttpResponse;
}

/// A bound HTTP/1 server; every connection is served on its own task
pub struct Application<H: RequestHandler> {
    listener: TcpListener,
    handler: Arc<H>,
    local_addr: SocketAddr,
}

impl<H: RequestHandler> Application<H> {
    /// Bind `handler` to `addr`. Port 0 picks a free port.
    pub async fn bind(addr: SocketAddr, handler: H) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            handler: Arc::new(handler),
            local_addr,
        })
    }

    /// Bind on all interfaces at `port`
    pub async fn bind_port(port: u16, handler: H) -> Result<Self> {
        Self::bind(SocketAddr::from(([0, 0, 0, 0], port)), handler).await
    }

    /// The address actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until the process ends
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves; in-flight connections keep running
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        info!(addr = %self.local_addr, "Server listening");
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
            };

            let io = TokioIo::new(stream);
            let handler = Arc::clone(&self.handler);

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let handler = Arc::clone(&handler);
                    async move { handle_request(req, handler).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%peer, "Error serving connection: {}", err);
                }
            });
        }
    }

    /// Serve on a background task
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }
}

/// Buffer an incoming request and hand it to the handler
async fn handle_request<H: RequestHandler>(
    req: Request<IncomingBody>,
    handler: Arc<H>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    debug!(method = %parts.method, path = parts.uri.path(), "Incoming request");

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            error!("Error when reading body: {}", err);
            return Ok(HttpResponse::text(400, format!("Error when reading body: {}", err))
                .into_hyper());
        }
    };

    let request = HttpRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        headers: parts.headers,
        body,
    };

    Ok(handler.handle(request).await.into_hyper())
}
