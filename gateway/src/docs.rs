//! OpenAPI 文档

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Oracle 查询网关 API",
        version = "0.1.0",
        description = "将 SQL 语句转发至 Oracle 数据库并以 JSON 返回结果"
    ),
    paths(
        handlers::health_check,
        handlers::test_connection,
        handlers::execute_query,
    ),
    components(schemas(
        common::models::QueryRequest,
        common::models::QueryResult,
        common::response::ApiError,
        common::response::ResponseStatus,
        common::response::EmptyData,
        handlers::HealthResponse,
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "status", description = "状态检查端点"),
        (name = "oracle", description = "Oracle 数据库操作")
    )
)]
pub struct ApiDoc;

/// 注册 Bearer 认证方案
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_gateway_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/health", "/api/connection", "/api/query"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_document_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
