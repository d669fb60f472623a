//! HTTP routes

pub mod content;
pub mod health;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::routing::site_gateway;
use crate::state::AppState;

/// Create the gateway router.
///
/// Health probes sit at root level for infrastructure monitoring and bypass
/// site resolution; everything else runs through the site gateway middleware
/// and falls through to the content handler.
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state.clone());

    let content_routes = Router::new()
        .fallback(content::serve)
        .layer(middleware::from_fn_with_state(state, site_gateway));

    health_routes
        .merge(content_routes)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sitegate_shared::{Site, SiteId};
    use tower::ServiceExt;

    use crate::config::Config;

    fn shop_site() -> Site {
        Site {
            id: SiteId::new(),
            domains: vec!["shop.example.com".to_string()],
            root_path: "/sites/shop".to_string(),
            main_domain: "shop.example.com".to_string(),
            redirect_to_main_domain: false,
        }
    }

    #[tokio::test]
    async fn test_health_endpoints_bypass_site_resolution() {
        let state = AppState::for_tests(vec![shop_site()], Config::for_tests());
        let app = create_router(state);

        for path in ["/health", "/health/live", "/health/ready"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(path)
                        .header("host", "shop.example.com")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_content_fallback_reports_site_binding() {
        let state = AppState::for_tests(vec![shop_site()], Config::for_tests());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/products/chair")
                    .header("host", "shop.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["site"], "shop.example.com");
        assert_eq!(json["document_path"], "/sites/shop/products/chair");
    }
}
