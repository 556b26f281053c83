//! services/api/src/web/routes.rs
//!
//! Builds the complete router: public auth routes, guarded habit routes,
//! no-cache headers and the Swagger UI.

use crate::web::{
    auth::{login_handler, login_page_handler, logout_handler, register_handler, register_page_handler},
    charts::plot_handler,
    entries::{update_handler, update_page_handler},
    habits::{add_handler, add_page_handler, index_handler, remove_handler, remove_page_handler},
    middleware::require_auth,
    rest::ApiDoc,
    state::AppState,
};
use axum::{
    http::{header, HeaderValue},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/login", get(login_page_handler).post(login_handler))
        .route("/register", get(register_page_handler).post(register_handler));

    // Protected routes (session required, otherwise redirect to /login)
    let protected_routes = Router::new()
        .route("/", get(index_handler).post(plot_handler))
        .route("/add", get(add_page_handler).post(add_handler))
        .route("/remove", get(remove_page_handler).post(remove_handler))
        .route("/update", get(update_page_handler).post(update_handler))
        .route("/logout", get(logout_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Ensure responses aren't cached
    let app_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .with_state(app_state);

    Router::new()
        .merge(app_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
