use std::collections::HashSet;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use common::error::{ApiError, ApiResult};

/// 单个 CEP 的地址信息, 以 `code` 为唯一键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CepRecord {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "street is required"))]
    pub street: String,
    pub complement: String,
    pub unit: Option<String>,
    #[validate(length(min = 1, message = "neighborhood is required"))]
    pub neighborhood: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(equal = 2, message = "stateCode must have 2 letters"))]
    pub state_code: String,
    #[validate(length(min = 1, message = "stateName is required"))]
    pub state_name: String,
    #[validate(length(min = 1, message = "region is required"))]
    pub region: String,
    #[validate(length(min = 1, message = "ibgeCode is required"))]
    pub ibge_code: String,
    pub gia_code: String,
    #[validate(length(min = 1, message = "areaCode is required"))]
    pub area_code: String,
    #[validate(length(min = 1, message = "siafiCode is required"))]
    pub siafi_code: String,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 列表过滤条件
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CepFilter {
    pub favorite: Option<bool>,
}

impl CepFilter {
    pub fn favorite(favorite: bool) -> Self {
        Self {
            favorite: Some(favorite),
        }
    }

    pub fn matches(&self, record: &CepRecord) -> bool {
        self.favorite.map_or(true, |favorite| record.favorite == favorite)
    }
}

/// Checks a whole replacement batch before anything is written: every record
/// must be storable and no code may appear twice.
pub fn validate_batch(records: &[CepRecord]) -> ApiResult<()> {
    let mut codes = HashSet::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        record.validate().map_err(|e| match ApiError::from(e) {
            ApiError::Validation(message) => {
                ApiError::Validation(format!("record {} ({}): {}", idx, record.code, message))
            }
            other => other,
        })?;

        if !codes.insert(record.code.as_str()) {
            return Err(ApiError::Validation(format!(
                "record {}: duplicate code {}",
                idx, record.code
            )));
        }
    }

    Ok(())
}

/// 当前时间, 截断到微秒, 与 Postgres `TIMESTAMPTZ` 精度一致
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// newest-created first, ties by code
pub fn sort_newest_first(records: &mut [CepRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.code.cmp(&b.code))
    });
}
