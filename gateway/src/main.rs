//! Oracle 查询网关
//!
//! 通过 HTTP 接收 SQL 语句，转发到 Oracle 数据库执行，并以 JSON 返回结果：
//! - 连接测试
//! - 语句执行（读语句返回行，写语句返回受影响行数）
//! - 可选的 Bearer 认证与按客户端限流

mod docs;
mod handlers;
mod routes;
mod service;
mod state;

use std::net::SocketAddr;

use anyhow::Context;
use common::config::{AppConfig, LogFormat};
use routes::create_router;
use state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "gateway";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 读取 .env 文件（可选）
    dotenvy::dotenv().ok();

    // 加载配置
    let config = AppConfig::load();

    // 初始化日志追踪
    init_tracing(&config);

    // 创建应用状态
    let state = AppState::new(&config);

    // 创建路由
    let app = create_router(state);

    // 启动服务
    let addr = config.bind_address();
    info!(
        service = SERVICE_NAME,
        address = %addr,
        oracle_host = %config.oracle.host,
        oracle_sid = %config.oracle.sid,
        auth = config.api_token.is_some(),
        "启动 Oracle 查询网关"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("服务运行失败")?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
