//! 查询网关服务模块

use serde_json::{Map, Value};

use common::errors::{AppError, AppResult};
use common::models::query::QueryResult;
use connection_manager::{BindParams, BindValue, ConnectionManager, ConnectorError, StatementOutcome};

/// 非标量绑定参数的错误信息
pub const NON_SCALAR_PARAMS: &str = "query params must be scalar values";

/// Oracle 查询网关服务
pub struct QueryGateway {
    connections: ConnectionManager,
}

impl QueryGateway {
    /// 创建新的查询网关实例
    pub fn new(connections: ConnectionManager) -> Self {
        Self { connections }
    }

    /// 测试数据库连接（打开后立即关闭，不执行语句）
    pub async fn test_connection(&self) -> AppResult<()> {
        match self.connections.ping().await {
            Ok(()) => Ok(()),
            Err(ConnectorError::Database(err)) => Err(AppError::DbConnection(err.pipe_separated())),
            Err(err @ ConnectorError::Unexpected(_)) => {
                tracing::error!(error = %err, "connection test failed unexpectedly");
                Err(AppError::DbConnection(err.to_string()))
            }
        }
    }

    /// 执行 SQL 语句
    ///
    /// 读语句返回按列顺序映射的行；写语句提交后返回受影响行数。
    pub async fn execute_query(&self, query: String, params: BindParams) -> AppResult<QueryResult> {
        let outcome = self
            .connections
            .execute(query, params)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "query execution failed");
                AppError::DbConnection(err.to_string())
            })?;

        Ok(match outcome {
            StatementOutcome::Rows { columns, rows } => {
                tracing::debug!(rows = rows.len(), "query returned rows");
                QueryResult::from_rows(&columns, rows)
            }
            StatementOutcome::Affected(count) => {
                tracing::debug!(rows_affected = count, "statement committed");
                QueryResult::affected(count)
            }
        })
    }
}

/// 将请求中的 JSON 参数转换为绑定参数
pub fn bind_params(params: Option<Map<String, Value>>) -> AppResult<BindParams> {
    params
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| match BindValue::from_json(&value) {
            Some(bind) => Ok((name, bind)),
            None => Err(AppError::BadRequest(NON_SCALAR_PARAMS.to_string())),
        })
        .collect()
}
