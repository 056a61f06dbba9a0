use axum::async_trait;
use sqlx::{Executor, Postgres, QueryBuilder};
use tracing::{debug, info};
use validator::Validate;

use common::error::ApiResult;
use common::pgsql::ConnPool;
use common::request::cep::ReqUpdateCep;

use crate::models::cep::{now, validate_batch, CepFilter, CepRecord};
use crate::models::{not_found, CepStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ceps (
    code         TEXT        PRIMARY KEY,
    street       TEXT        NOT NULL,
    complement   TEXT        NOT NULL DEFAULT '',
    unit         TEXT,
    neighborhood TEXT        NOT NULL,
    city         TEXT        NOT NULL,
    state_code   VARCHAR(2)  NOT NULL,
    state_name   TEXT        NOT NULL,
    region       TEXT        NOT NULL,
    ibge_code    TEXT        NOT NULL,
    gia_code     TEXT        NOT NULL DEFAULT '',
    area_code    TEXT        NOT NULL,
    siafi_code   TEXT        NOT NULL,
    favorite     BOOLEAN     NOT NULL DEFAULT FALSE,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
ALTER TABLE ceps ALTER COLUMN code TYPE TEXT;
CREATE INDEX IF NOT EXISTS ceps_favorite_idx ON ceps (favorite);
"#;

const COLUMNS: &str = "code,street,complement,unit,neighborhood,city,state_code,state_name,\
region,ibge_code,gia_code,area_code,siafi_code,favorite,created_at,updated_at";

const COLUMN_COUNT: usize = 16;

/// postgres 单条语句最多 65535 个绑定参数
const BIND_LIMIT: usize = 65535;

/// Postgres 存储
#[derive(Debug, Clone)]
pub struct PgCepStore {
    pool: ConnPool,
}

impl PgCepStore {
    pub fn new(pool: ConnPool) -> Self {
        Self { pool }
    }

    /// 创建数据表, 已存在时跳过
    pub async fn migrate(&self) -> ApiResult<()> {
        self.pool.execute(SCHEMA).await?;
        info!("table ceps ready");
        Ok(())
    }
}

#[async_trait]
impl CepStore for PgCepStore {
    async fn list(&self, filter: CepFilter) -> ApiResult<Vec<CepRecord>> {
        let mut sql_str = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM ceps", COLUMNS));
        if let Some(favorite) = filter.favorite {
            sql_str.push(" WHERE favorite = ").push_bind(favorite);
        }
        sql_str.push(" ORDER BY created_at DESC, code ASC");

        Ok(sql_str
            .build_query_as::<CepRecord>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get(&self, code: &str) -> ApiResult<CepRecord> {
        sqlx::query_as::<_, CepRecord>(&format!("SELECT {} FROM ceps WHERE code = $1", COLUMNS))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(code))
    }

    async fn replace_all(&self, records: Vec<CepRecord>) -> ApiResult<()> {
        validate_batch(&records)?;

        let mut tx = self.pool.begin().await?;
        // readers keep the previous snapshot until commit; other writers wait
        sqlx::query("LOCK TABLE ceps IN EXCLUSIVE MODE")
            .execute(&mut tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM ceps")
            .execute(&mut tx)
            .await?
            .rows_affected();

        for chunk in records.chunks(BIND_LIMIT / COLUMN_COUNT) {
            let mut sql_str =
                QueryBuilder::<Postgres>::new(format!("INSERT INTO ceps ({}) ", COLUMNS));
            sql_str.push_values(chunk, |mut row, record| {
                row.push_bind(record.code.clone())
                    .push_bind(record.street.clone())
                    .push_bind(record.complement.clone())
                    .push_bind(record.unit.clone())
                    .push_bind(record.neighborhood.clone())
                    .push_bind(record.city.clone())
                    .push_bind(record.state_code.clone())
                    .push_bind(record.state_name.clone())
                    .push_bind(record.region.clone())
                    .push_bind(record.ibge_code.clone())
                    .push_bind(record.gia_code.clone())
                    .push_bind(record.area_code.clone())
                    .push_bind(record.siafi_code.clone())
                    .push_bind(record.favorite)
                    .push_bind(record.created_at)
                    .push_bind(record.updated_at);
            });
            sql_str.build().execute(&mut tx).await?;
        }

        tx.commit().await?;
        debug!("ceps replaced: {} deleted, {} inserted", deleted, records.len());
        Ok(())
    }

    async fn update(&self, code: &str, info: ReqUpdateCep) -> ApiResult<CepRecord> {
        info.validate()?;

        sqlx::query_as::<_, CepRecord>(&format!(
            "UPDATE ceps SET street = COALESCE($1, street), neighborhood = COALESCE($2, neighborhood), \
            updated_at = $3 WHERE code = $4 RETURNING {}",
            COLUMNS
        ))
        .bind(info.street)
        .bind(info.neighborhood)
        .bind(now())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(code))
    }

    async fn toggle_favorite(&self, code: &str) -> ApiResult<CepRecord> {
        sqlx::query_as::<_, CepRecord>(&format!(
            "UPDATE ceps SET favorite = NOT favorite, updated_at = $1 WHERE code = $2 RETURNING {}",
            COLUMNS
        ))
        .bind(now())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(code))
    }
}
