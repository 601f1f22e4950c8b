use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http_body_util::{BodyExt as _, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tokio::time::Instant;

use super::headers::{
    CONTEXT_TTL_MS, DEFAULT_TTL, RPC_CALLER, RPC_PROCEDURE, RPC_SERVICE, merge_headers,
    ttl_millis,
};
use super::{Error, HttpOptions, Request, Response, Result};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Sends RPC requests as HTTP POSTs to a fixed set of endpoints.
///
/// Cloning is cheap; clones share the connection pool and the endpoint cursor.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    urls: Vec<hyper::Uri>,
    source: Option<HeaderValue>,
    target: HeaderValue,
    next: AtomicUsize,
}

fn parse_url(raw: &str) -> Result<hyper::Uri> {
    let parsed = url::Url::parse(raw).map_err(|_| Error::InvalidUrl(raw.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::UnsupportedScheme(raw.to_string()));
    }
    raw.parse().map_err(|_| Error::InvalidUrl(raw.to_string()))
}

fn service_header(name: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(name).map_err(|_| Error::InvalidServiceName(name.to_string()))
}

impl HttpTransport {
    pub fn new(opts: HttpOptions) -> Result<Self> {
        if opts.urls.is_empty() {
            return Err(Error::NoUrls);
        }
        if opts.target_service.is_empty() {
            return Err(Error::MissingTarget);
        }

        let urls = opts
            .urls
            .iter()
            .map(String::as_str)
            .map(parse_url)
            .collect::<Result<Vec<_>>>()?;
        let target = service_header(&opts.target_service)?;
        let source = match opts.source_service.as_deref() {
            None | Some("") => None,
            Some(s) => Some(service_header(s)?),
        };

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_connect_timeout(Some(
            opts.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        ));

        let https_connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let inner = Client::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self {
            inner,
            shared: Arc::new(Shared {
                urls,
                source,
                target,
                next: AtomicUsize::new(0),
            }),
        })
    }

    fn next_url(&self) -> &hyper::Uri {
        let urls = &self.shared.urls;
        let idx = self.shared.next.fetch_add(1, Ordering::Relaxed) % urls.len();
        &urls[idx]
    }

    fn build_request(
        &self,
        uri: hyper::Uri,
        req: &Request,
        ttl: Duration,
    ) -> Result<hyper::Request<Full<Bytes>>> {
        let mut builder = hyper::Request::builder()
            .method(http::Method::POST)
            .uri(uri);

        for (k, v) in &req.headers {
            let name = HeaderName::from_bytes(k.as_bytes())?;
            let value = HeaderValue::from_str(v)?;
            builder = builder.header(name, value);
        }

        let mut out = builder.body(Full::new(req.body.clone()))?;

        // Metadata wins over same-named user headers.
        let headers = out.headers_mut();
        headers.insert(RPC_SERVICE, self.shared.target.clone());
        if let Some(source) = &self.shared.source {
            headers.insert(RPC_CALLER, source.clone());
        }
        headers.insert(RPC_PROCEDURE, HeaderValue::from_str(&req.method)?);
        headers.insert(CONTEXT_TTL_MS, HeaderValue::from(ttl_millis(ttl)));

        Ok(out)
    }

    async fn exchange(&self, req: hyper::Request<Full<Bytes>>) -> Result<Response> {
        let res = self.inner.request(req).await.map_err(Error::from_request)?;

        let (parts, body) = res.into_parts();
        if !parts.status.is_success() {
            return Err(Error::Status {
                code: parts.status.as_u16(),
            });
        }

        let body = body.collect().await.map_err(Error::from_body)?.to_bytes();

        Ok(Response {
            body,
            headers: merge_headers(&parts.headers),
        })
    }

    /// Performs one call.
    ///
    /// The remaining time until `deadline` is advertised in `Context-TTL-MS` and bounds the whole
    /// exchange, body included; on expiry the in-flight request is dropped. Without a deadline
    /// [`crate::DEFAULT_TTL`] is advertised and the wait is unbounded.
    pub async fn call(&self, deadline: Option<Instant>, req: &Request) -> Result<Response> {
        if req.method.is_empty() {
            return Err(Error::MissingMethod);
        }

        let ttl = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(Error::DeadlineExceeded { budget: remaining });
                }
                remaining
            }
            None => DEFAULT_TTL,
        };

        let uri = self.next_url().clone();
        tracing::debug!(
            procedure = %req.method,
            url = %uri,
            ttl_ms = ttl_millis(ttl),
            "sending request"
        );

        let http_req = self.build_request(uri, req, ttl)?;
        let res = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.exchange(http_req))
                .await
                .unwrap_or(Err(Error::DeadlineExceeded { budget: ttl })),
            None => self.exchange(http_req).await,
        };

        match &res {
            Ok(response) => tracing::debug!(
                procedure = %req.method,
                body_len = response.body.len(),
                "call succeeded"
            ),
            Err(err) => tracing::debug!(
                procedure = %req.method,
                kind = %err.kind(),
                error = %err,
                "call failed"
            ),
        }
        res
    }

    /// Convenience for [`HttpTransport::call`] with a deadline `timeout` from now.
    pub async fn call_with_timeout(&self, timeout: Duration, req: &Request) -> Result<Response> {
        self.call(Some(Instant::now() + timeout), req).await
    }
}
