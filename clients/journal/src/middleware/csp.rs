//! Content-Security-Policy middleware.
//!
//! Every response to a page path carries one fixed policy. API routes,
//! framework assets, the favicon and any path whose last segment has a file
//! extension pass through untouched.

use axum::{
    body::Body,
    http::{header::CONTENT_SECURITY_POLICY, HeaderValue, Request},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Policy attached to page responses. `'unsafe-eval'` is required by the
/// wallet and web3 bundles served to the browser.
pub const CSP_POLICY: &str = concat!(
    "default-src 'self'; ",
    "script-src 'self' 'unsafe-eval' 'unsafe-inline'; ",
    "style-src 'self' 'unsafe-inline'; ",
    "img-src 'self' data: https: blob:; ",
    "font-src 'self' data:; ",
    "connect-src 'self' https: wss: ws: http:; ",
    "worker-src 'self' blob:; ",
    "child-src 'self' blob:; ",
    "object-src 'none'; ",
    "base-uri 'self'; ",
    "form-action 'self'"
);

/// Prefixes (after the leading `/`) that never get the header.
const EXCLUDED_PREFIXES: [&str; 3] = ["api", "_next", "favicon.ico"];

/// Whether `path` is exempt from the policy header.
pub fn is_excluded_path(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);

    if EXCLUDED_PREFIXES.iter().any(|prefix| rest.starts_with(prefix)) {
        return true;
    }

    // Static asset: the last segment has an extension
    rest.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

/// Layer adding the CSP header.
#[derive(Clone, Copy, Debug, Default)]
pub struct CspLayer;

impl CspLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CspLayer {
    type Service = CspService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CspService { inner }
    }
}

/// Service adding the CSP header to non-excluded responses.
#[derive(Clone, Debug)]
pub struct CspService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for CspService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let apply = !is_excluded_path(req.uri().path());
        let future = self.inner.call(req);

        Box::pin(async move {
            let mut response = future.await?;
            if apply {
                response
                    .headers_mut()
                    .insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(CSP_POLICY));
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_paths() {
        for path in [
            "/api/foo",
            "/api",
            "/_next/static/chunks/main.js",
            "/_next/image",
            "/favicon.ico",
            "/image.png",
            "/assets/fonts/inter.woff2",
        ] {
            assert!(is_excluded_path(path), "{path} should be excluded");
        }
    }

    #[test]
    fn test_page_paths() {
        for path in ["/", "/journal", "/account/9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin"] {
            assert!(!is_excluded_path(path), "{path} should get the header");
        }
    }

    #[test]
    fn test_dot_in_directory_only() {
        // Only the last segment counts as a file name
        assert!(!is_excluded_path("/v1.2/journal"));
    }

    #[test]
    fn test_policy_directives() {
        let directives: Vec<&str> = CSP_POLICY.split("; ").collect();
        assert_eq!(directives.len(), 11);
        assert_eq!(directives[0], "default-src 'self'");
        assert_eq!(directives[8], "object-src 'none'");
        assert_eq!(directives[10], "form-action 'self'");
        assert!(HeaderValue::from_str(CSP_POLICY).is_ok());
    }
}
