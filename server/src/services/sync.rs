use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info};

use common::error::{ApiError, ApiResult};

use crate::models::cep::now;
use crate::models::{CepRecord, CepStore};
use crate::services::CepSource;

/// 同步服务: 从外部数据源拉取全部地址, 整体替换本地存储
///
/// Favorites are not carried over: every sync produces fresh records with
/// `favorite = false`.
pub struct SyncService {
    store: Arc<dyn CepStore>,
    source: Arc<dyn CepSource>,
}

impl SyncService {
    pub fn new(store: Arc<dyn CepStore>, source: Arc<dyn CepSource>) -> Self {
        Self { store, source }
    }

    /// 拉取并转换数据源记录, 不写入存储
    ///
    /// The whole batch shares one timestamp taken after the fetch.
    pub async fn fetch_source_records(&self) -> ApiResult<Vec<CepRecord>> {
        let entries = self.source.fetch_entries().await?;
        let now = now();
        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| map_entry(idx, entry, now))
            .collect()
    }

    /// 返回写入的记录数, 失败时不重试, 存储保持原样
    pub async fn sync(&self) -> ApiResult<usize> {
        info!("sync started");
        let result = self.replace_from_source().await;
        match &result {
            Ok(count) => info!("sync finished, {} CEPs stored", count),
            Err(e) => error!("sync failed: {}", e),
        }

        result
    }

    async fn replace_from_source(&self) -> ApiResult<usize> {
        let records = self.fetch_source_records().await?;
        info!("received {} CEPs from source", records.len());

        let count = records.len();
        self.store.replace_all(records).await?;
        Ok(count)
    }
}

/// ViaCEP entry -> CepRecord
fn map_entry(idx: usize, entry: &Value, now: DateTime<Utc>) -> ApiResult<CepRecord> {
    let entry = entry
        .as_object()
        .ok_or_else(|| ApiError::Mapping(format!("entry {}: not a JSON object", idx)))?;

    let required = |key: &str| -> ApiResult<String> {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::Mapping(format!("entry {}: missing required field `{}`", idx, key))
            })
    };
    let optional = |key: &str| -> Option<String> {
        entry.get(key).and_then(Value::as_str).map(str::to_string)
    };

    Ok(CepRecord {
        code: required("cep")?,
        street: required("logradouro")?,
        complement: optional("complemento").unwrap_or_default(),
        unit: optional("unidade"),
        neighborhood: required("bairro")?,
        city: required("localidade")?,
        state_code: required("uf")?,
        state_name: required("estado")?,
        region: required("regiao")?,
        ibge_code: required("ibge")?,
        gia_code: optional("gia").unwrap_or_default(),
        area_code: required("ddd")?,
        siafi_code: required("siafi")?,
        favorite: false,
        created_at: now,
        updated_at: now,
    })
}
