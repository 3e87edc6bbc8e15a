use crate::{Error, Result, qr};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// One-route HTTP relay: each hit on `/qris*` fetches a fresh payment code
/// upstream and answers with a page embedding it as a scannable QR.
///
/// No state is shared across requests; every hit is an independent
/// fetch-render round trip.
pub struct RelayServer {
    port: u16,
    endpoint: String,
}

impl RelayServer {
    pub fn new(port: u16, endpoint: impl Into<String>) -> Self {
        Self {
            port,
            endpoint: endpoint.into(),
        }
    }

    /// Accept connections forever.
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Http(format!("bind {addr} failed: {e}")))?;

        tracing::info!("relay listening on http://{addr}");

        let client = reqwest::Client::new();
        let endpoint = Arc::new(self.endpoint);

        loop {
            let (stream, peer) = listener
                .accept()
                .await
                .map_err(|e| Error::Http(format!("accept failed: {e}")))?;

            let io = TokioIo::new(stream);
            let client = client.clone();
            let endpoint = endpoint.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let client = client.clone();
                    let endpoint = endpoint.clone();
                    async move { Ok::<_, Infallible>(handle(req, &client, &endpoint).await) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::debug!("connection from {peer} ended with error: {e}");
                }
            });
        }
    }
}

/// Route a single request. Only `/qris*` is served.
pub async fn handle<B>(
    req: Request<B>,
    client: &reqwest::Client,
    endpoint: &str,
) -> Response<Full<Bytes>> {
    if !req.uri().path().starts_with("/qris") {
        return plain(StatusCode::NOT_FOUND, "Not Found");
    }

    match render_page(client, endpoint).await {
        Ok(html) => response(StatusCode::OK, "text/html; charset=utf-8", html),
        Err(e) => {
            tracing::warn!("relay request failed: {e}");
            plain(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

async fn render_page(client: &reqwest::Client, endpoint: &str) -> Result<String> {
    let code = qr::fetch_payment_code(client, endpoint).await?;
    let png = qr::render_png(&code)?;
    Ok(qr::qr_page(&png))
}

fn plain(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    response(status, "text/plain; charset=utf-8", message.to_string())
}

fn response(status: StatusCode, content_type: &str, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, content_type)
        .body(Full::new(Bytes::from(body)))
        .expect("static response parts are valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let req = Request::builder().uri("/health").body(()).unwrap();
        let res = handle(req, &reqwest::Client::new(), "http://127.0.0.1:1/unused").await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(res).await, "Not Found");
    }

    #[tokio::test]
    async fn qris_prefix_with_unreachable_upstream_is_bad_request() {
        // Port 1 refuses immediately; the route matches but the upstream
        // fetch fails.
        let req = Request::builder().uri("/qris?fresh=1").body(()).unwrap();
        let res = handle(req, &reqwest::Client::new(), "http://127.0.0.1:1/vote").await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(res).await.contains("upstream request failed"));
    }
}
