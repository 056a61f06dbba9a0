use axum::async_trait;

use common::error::ApiResult;
use common::request::cep::ReqUpdateCep;

pub use self::cep::{CepFilter, CepRecord};
pub use self::memory::MemoryCepStore;
pub use self::pgsql::PgCepStore;

pub mod cep;
pub mod memory;
pub mod pgsql;

/// CEP 记录存储
///
/// Every mutating operation is atomic inside the backend, so callers never
/// need their own locking and readers never observe a half-applied replace.
#[async_trait]
pub trait CepStore: Send + Sync {
    /// All records, newest-created first, optionally narrowed by `filter`.
    async fn list(&self, filter: CepFilter) -> ApiResult<Vec<CepRecord>>;

    /// `ApiError::NotFound` when `code` is unknown.
    async fn get(&self, code: &str) -> ApiResult<CepRecord>;

    /// Discards every stored record and inserts `records` as one unit.
    /// The batch is validated first; on any failure the prior contents stay.
    async fn replace_all(&self, records: Vec<CepRecord>) -> ApiResult<()>;

    /// Applies only the fields present in `info`.
    async fn update(&self, code: &str, info: ReqUpdateCep) -> ApiResult<CepRecord>;

    /// Flips `favorite`; two calls restore the original value.
    async fn toggle_favorite(&self, code: &str) -> ApiResult<CepRecord>;
}

pub(crate) fn not_found(code: &str) -> common::error::ApiError {
    common::error::ApiError::NotFound(format!("CEP {} not found", code))
}
