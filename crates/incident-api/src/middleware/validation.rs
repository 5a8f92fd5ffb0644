//! Request body size limit.
//!
//! Rejects with 413 when `content-length` exceeds the limit, or when a
//! streamed body turns out larger than declared.

use crate::domain::{ApiError, LimitsConfig};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_LENGTH, Request},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Validation layer configuration
#[derive(Clone)]
pub struct ValidationLayer {
    config: Arc<LimitsConfig>,
}

impl ValidationLayer {
    pub fn new(config: LimitsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Validation service
#[derive(Clone)]
pub struct ValidationService<S> {
    inner: S,
    config: Arc<LimitsConfig>,
}

impl<S> Service<Request<Body>> for ValidationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let limit = self.config.max_request_size;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Check content-length header first (fast path)
            if let Some(len) = declared_length(&req) {
                if len > limit {
                    warn!(size = len, max = limit, "Request too large (from header)");
                    return Ok(ApiError::payload_too_large(limit).into_response());
                }
            }

            if !carries_body(&req) {
                return inner.call(req).await;
            }

            let (parts, body) = req.into_parts();
            let bytes = match to_bytes(body, limit).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, max = limit, "Failed to read request body");
                    return Ok(ApiError::payload_too_large(limit).into_response());
                }
            };

            inner.call(Request::from_parts(parts, Body::from(bytes))).await
        })
    }
}

fn declared_length<B>(req: &Request<B>) -> Option<usize> {
    req.headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn carries_body<B>(req: &Request<B>) -> bool {
    use axum::http::Method;
    matches!(*req.method(), Method::POST | Method::PATCH | Method::PUT)
}
