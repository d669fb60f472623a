//! Site routing middleware
//!
//! Runs early on every request, in two strictly ordered steps:
//!
//! 1. Site resolution: bind the site matching the request host (skipped for
//!    administrative traffic) and rewrite the effective content path.
//! 2. Canonical-host redirect: if the host should be redirected to the main
//!    domain, answer 301 immediately and write one redirect audit line; no
//!    further handling runs.

pub mod cache;
pub mod classifier;
pub mod redirect;
pub mod resolver;

pub use cache::SiteCache;
pub use classifier::RequestClassifier;
pub use resolver::{normalize_host, SiteContext, SiteResolver};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::audit::{audit_client_ip, RedirectEntry};
use crate::config::DISABLE_HOST_REDIRECT_FIELD;
use crate::error::ApiError;
use crate::state::AppState;

/// Largest form body inspected for the redirect opt-out field.
const MAX_FORM_BODY_BYTES: usize = 1024 * 1024;

/// Site resolution + canonical-host redirect middleware.
pub async fn site_gateway(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri().clone();
    let raw_path = uri.path();
    let query = uri.query();

    let host = match request_host(&request) {
        Some(host) => normalize_host(&host),
        // No Host at all: nothing to resolve or redirect.
        None => return next.run(request).await,
    };

    let is_admin = state.classifier.is_admin(raw_path, query);

    // Step 1: site resolution. Admin traffic is never bound.
    let context = if is_admin {
        None
    } else {
        Some(state.resolver.resolve(&host, raw_path).await)
    };

    let site = context.as_ref().and_then(|ctx| ctx.site.clone());
    let target = redirect::compute_redirect(&host, site.as_deref(), &state.config, is_admin);

    let mut request = request;
    if let Some(context) = context {
        request.extensions_mut().insert(context);
    }

    // Step 2: canonical-host redirect, unless the opt-out field is present.
    let Some(target) = target else {
        return next.run(request).await;
    };

    if query
        .map(|q| redirect::form_has_field(q.as_bytes(), DISABLE_HOST_REDIRECT_FIELD))
        .unwrap_or(false)
    {
        return next.run(request).await;
    }

    if has_form_body(&request) {
        let (parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_FORM_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read form body for redirect opt-out");
                return ApiError::BadRequest("unreadable form body".to_string()).into_response();
            }
        };
        let opted_out = redirect::form_has_field(&bytes, DISABLE_HOST_REDIRECT_FIELD);
        request = Request::from_parts(parts, Body::from(bytes));
        if opted_out {
            return next.run(request).await;
        }
    }

    let scheme = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    let destination =
        redirect::build_redirect_url(scheme, &target, &state.config.base_path, raw_path, query);

    let location = match HeaderValue::from_str(&destination) {
        Ok(location) => location,
        Err(e) => {
            tracing::error!(error = %e, destination = %destination, "invalid redirect destination");
            return next.run(request).await;
        }
    };

    let source = match query {
        Some(q) => format!("{raw_path}?{q}"),
        None => raw_path.to_string(),
    };
    state.audit.record(&RedirectEntry {
        client_ip: audit_client_ip(request.headers(), state.config.anonymize_client_ip),
        source,
        destination,
    });

    let mut response = StatusCode::MOVED_PERMANENTLY.into_response();
    response.headers_mut().insert(header::LOCATION, location);
    response
}

/// Host header, falling back to the request target's authority.
fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

fn has_form_body(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}
