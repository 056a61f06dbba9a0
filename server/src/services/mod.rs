use axum::async_trait;
use serde_json::Value;

use common::error::ApiResult;

pub use self::sync::SyncService;
pub use self::viacep::ViaCepSource;

pub mod sync;
pub mod viacep;

/// 外部 CEP 数据源
///
/// Entries come back untyped; turning them into records is the sync
/// service's job, so nothing from the wire is trusted before mapping.
#[async_trait]
pub trait CepSource: Send + Sync {
    async fn fetch_entries(&self) -> ApiResult<Vec<Value>>;
}
