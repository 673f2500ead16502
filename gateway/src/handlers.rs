//! Handler模块

use std::any::Any;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use common::errors::AppError;
use common::models::query::{first_validation_message, QueryRequest, QueryResult, MISSING_QUERY};
use common::response::{ApiResponse, EmptyData};
use crate::service::{self, QueryGateway};
use crate::state::AppState;

/// 请求体为空或不是合法 JSON 对象时的错误信息
pub const MALFORMED_BODY: &str = "request body empty or malformed";

/// 连接测试成功时的信息
pub const CONNECTION_ESTABLISHED: &str = "connection established";

const SERVICE_NAME: &str = "gateway";

/// 服务首页
pub async fn home() -> &'static str {
    "Oracle query gateway is running"
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "status",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// 测试 Oracle 数据库连接
#[utoipa::path(
    get,
    path = "/api/connection",
    tag = "oracle",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "连接成功", body = ApiResponse<EmptyData>),
        (status = 401, description = "未授权", body = ApiResponse<EmptyData>),
        (status = 429, description = "请求过于频繁", body = ApiResponse<EmptyData>),
        (status = 503, description = "数据库连接失败", body = ApiResponse<EmptyData>)
    )
)]
pub async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<EmptyData>>, AppError> {
    let gateway = QueryGateway::new(state.connections);
    gateway.test_connection().await?;
    Ok(Json(ApiResponse::message(CONNECTION_ESTABLISHED)))
}

/// 执行 SQL 语句
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "oracle",
    request_body = QueryRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "执行成功", body = ApiResponse<QueryResult>),
        (status = 400, description = "请求体无效或缺少 query", body = ApiResponse<EmptyData>),
        (status = 401, description = "未授权", body = ApiResponse<EmptyData>),
        (status = 429, description = "请求过于频繁", body = ApiResponse<EmptyData>),
        (status = 503, description = "数据库连接或执行失败", body = ApiResponse<EmptyData>)
    )
)]
pub async fn execute_query(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<QueryResult>>, AppError> {
    let req = parse_query_request(payload)?;
    req.validate()
        .map_err(|errors| AppError::BadRequest(first_validation_message(&errors)))?;

    let query = req
        .query
        .ok_or_else(|| AppError::BadRequest(MISSING_QUERY.to_string()))?;
    let params = service::bind_params(req.params)?;

    let gateway = QueryGateway::new(state.connections);
    let result = gateway.execute_query(query, params).await?;
    Ok(Json(ApiResponse::ok(result)))
}

fn parse_query_request(payload: Result<Json<Value>, JsonRejection>) -> Result<QueryRequest, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "request body rejected");
        AppError::BadRequest(MALFORMED_BODY.to_string())
    })?;

    if !body.is_object() {
        return Err(AppError::BadRequest(MALFORMED_BODY.to_string()));
    }

    serde_json::from_value(body).map_err(|err| {
        tracing::debug!(error = %err, "request body has unexpected field types");
        AppError::BadRequest(MALFORMED_BODY.to_string())
    })
}

/// 未匹配路由
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

/// 路径存在但方法不支持
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("method {method} not allowed on {}", uri.path()))
}

/// 将处理器中的 panic 转换为 500 响应，不向客户端暴露内部信息
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(detail).into_response()
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
}
