use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::application::PostgresConfig;
use crate::error::ApiResult;

pub type ConnPool = sqlx::PgPool;

/// 建立数据库连接池, 连接失败时直接返回错误
pub async fn connect(config: &PostgresConfig) -> ApiResult<ConnPool> {
    let conn_pool = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await?;
    info!("postgres pool ready, max_connections: {}", config.pool_size);

    Ok(conn_pool)
}
