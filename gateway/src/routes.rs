//! 网关路由模块

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use common::middleware::{auth_middleware, rate_limit_middleware, request_id_middleware};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::docs::ApiDoc;
use crate::handlers;
use crate::state::AppState;

/// 创建网关路由
pub fn router(state: &AppState) -> Router<AppState> {
    let query = Router::new()
        .route("/api/query", post(handlers::execute_query))
        .route_layer(middleware::from_fn_with_state(
            state.query_limiter.clone(),
            rate_limit_middleware,
        ));

    let database = Router::new()
        .route("/api/connection", get(handlers::test_connection))
        .merge(query)
        .route_layer(middleware::from_fn_with_state(
            state.api_token.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::home))
        .route("/api/health", get(handlers::health_check))
        .route("/api/docs/apispec.json", get(openapi_json))
        .merge(database)
}

/// 组装完整的应用（路由 + 中间件）
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(router(&state))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.default_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
