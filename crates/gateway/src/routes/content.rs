//! Content fallback handler
//!
//! The gateway's job ends at resolving the effective document path; the
//! content tree itself is an external collaborator. This handler reports
//! which document would be served, for the downstream renderer and for
//! integration tests.

use axum::{extract::Request, Json};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::routing::SiteContext;

#[derive(Serialize)]
pub struct ContentResponse {
    /// Main domain of the bound site, if any.
    pub site: Option<String>,
    /// Effective path within the content tree.
    pub document_path: String,
}

/// Report the document the request resolves to.
pub async fn serve(request: Request) -> ApiResult<Json<ContentResponse>> {
    let (site, document_path) = match request.extensions().get::<SiteContext>() {
        Some(ctx) => (
            ctx.site.as_ref().map(|s| s.main_domain.clone()),
            ctx.site_path.clone(),
        ),
        // Administrative traffic is never bound; serve from the tree root.
        None => (None, request.uri().path().to_string()),
    };

    // The effective path must stay inside the content tree.
    if document_path.split('/').any(|segment| segment == "..") {
        return Err(ApiError::NotFound);
    }

    Ok(Json(ContentResponse {
        site,
        document_path,
    }))
}
