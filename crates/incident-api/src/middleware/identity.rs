//! Caller identity resolution.
//!
//! Maps request headers to a [`CallerId`] and stores it in the request
//! extensions. Requests without an identity still pass through; handlers
//! decide whether a caller is required.

use crate::domain::config::IdentityConfig;
use crate::domain::ConfigError;
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, HeaderMap, HeaderName, Request},
    response::Response,
};
use incident_core::CallerId;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::debug;

/// Identity collaborator: request headers to caller, or `None` when the
/// request is unauthenticated.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<CallerId>;
}

/// Bearer tokens mapped to user ids.
pub struct SessionTokenIdentity {
    sessions: Vec<(String, CallerId)>,
}

impl SessionTokenIdentity {
    pub fn new<I, T, U>(sessions: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            sessions: sessions
                .into_iter()
                .map(|(token, user)| (token.into(), CallerId::new(user)))
                .collect(),
        }
    }
}

impl IdentityProvider for SessionTokenIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<CallerId> {
        let token = bearer_token(headers)?;
        // Compare against every entry so timing does not reveal the index.
        let mut found = None;
        for (candidate, user) in &self.sessions {
            if constant_time_compare(token, candidate) && found.is_none() {
                found = Some(user.clone());
            }
        }
        found
    }
}

/// User id taken verbatim from a header set by an authenticating proxy.
pub struct TrustedHeaderIdentity {
    header: HeaderName,
}

impl TrustedHeaderIdentity {
    pub fn new(header: &str) -> Result<Self, ConfigError> {
        let header = HeaderName::from_bytes(header.trim().as_bytes())
            .map_err(|e| ConfigError::Invalid(format!("trusted_user_header: {e}")))?;
        Ok(Self { header })
    }
}

impl IdentityProvider for TrustedHeaderIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<CallerId> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        (!value.is_empty()).then(|| CallerId::new(value))
    }
}

/// First provider that resolves wins.
pub struct ChainedIdentity {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl ChainedIdentity {
    pub fn new(providers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        Self { providers }
    }
}

impl IdentityProvider for ChainedIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<CallerId> {
        self.providers.iter().find_map(|p| p.resolve(headers))
    }
}

/// Build the provider chain described by `config`.
pub fn identity_from_config(
    config: &IdentityConfig,
) -> Result<Arc<dyn IdentityProvider>, ConfigError> {
    let mut providers: Vec<Arc<dyn IdentityProvider>> = Vec::new();
    if !config.sessions.is_empty() {
        providers.push(Arc::new(SessionTokenIdentity::new(
            config
                .sessions
                .iter()
                .map(|(token, user)| (token.clone(), user.clone())),
        )));
    }
    if let Some(header) = &config.trusted_user_header {
        providers.push(Arc::new(TrustedHeaderIdentity::new(header)?));
    }
    Ok(Arc::new(ChainedIdentity::new(providers)))
}

/// Identity layer
#[derive(Clone)]
pub struct IdentityLayer {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityLayer {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

impl<S> Layer<S> for IdentityLayer {
    type Service = IdentityService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IdentityService {
            inner,
            provider: Arc::clone(&self.provider),
        }
    }
}

/// Identity service
#[derive(Clone)]
pub struct IdentityService<S> {
    inner: S,
    provider: Arc<dyn IdentityProvider>,
}

impl<S> Service<Request<Body>> for IdentityService<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        match self.provider.resolve(req.headers()) {
            Some(caller) => {
                debug!(caller = %caller, "Resolved caller");
                req.extensions_mut().insert(caller);
            }
            None => debug!("No caller identity on request"),
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Constant-time string comparison to prevent timing attacks
///
/// Takes the same time regardless of how many leading bytes match. Inputs
/// of different length are padded with different bytes so they never
/// compare equal.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
