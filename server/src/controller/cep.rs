use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::Extension;

use common::error::ApiError;
use common::request::cep::{ReqQueryCep, ReqUpdateCep};
use common::response::cep::ResSync;
use common::{ApiResponse, AppExtractor};

use crate::models::CepFilter;
use crate::AppState;

pub struct CepController;

impl CepController {
    /// CEP 列表, `?favorite=true|false` 过滤收藏
    pub async fn list_ceps(
        Extension(state): Extension<Arc<AppState>>,
        query: Result<Query<ReqQueryCep>, QueryRejection>,
    ) -> impl IntoResponse {
        let query = match query {
            Ok(Query(query)) => query,
            Err(e) => return ApiError::Validation(e.body_text()).into_response(),
        };
        let filter = match query.favorite() {
            Some(favorite) => CepFilter::favorite(favorite),
            None => CepFilter::default(),
        };
        match state.store.list(filter).await {
            Ok(result) => ApiResponse::response(result).json(),
            Err(e) => e.into_response(),
        }
    }

    /// CEP 详情
    pub async fn get_cep(
        Extension(state): Extension<Arc<AppState>>,
        code: Result<Path<String>, PathRejection>,
    ) -> impl IntoResponse {
        let code = match path_code(code) {
            Ok(code) => code,
            Err(e) => return e.into_response(),
        };
        match state.store.get(&code).await {
            Ok(result) => ApiResponse::response(result).json(),
            Err(e) => e.into_response(),
        }
    }

    /// 更新街道与街区
    pub async fn update_cep(
        Extension(state): Extension<Arc<AppState>>,
        code: Result<Path<String>, PathRejection>,
        params: AppExtractor<ReqUpdateCep>,
    ) -> impl IntoResponse {
        let code = match path_code(code) {
            Ok(code) => code,
            Err(e) => return e.into_response(),
        };
        match state.store.update(&code, params.inner).await {
            Ok(result) => ApiResponse::response(result).json(),
            Err(e) => e.into_response(),
        }
    }

    /// 收藏 / 取消收藏
    pub async fn toggle_favorite(
        Extension(state): Extension<Arc<AppState>>,
        code: Result<Path<String>, PathRejection>,
    ) -> impl IntoResponse {
        let code = match path_code(code) {
            Ok(code) => code,
            Err(e) => return e.into_response(),
        };
        match state.store.toggle_favorite(&code).await {
            Ok(result) => ApiResponse::response(result).json(),
            Err(e) => e.into_response(),
        }
    }

    /// 重新从 ViaCEP 同步, 会清空收藏状态
    pub async fn sync_ceps(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
        match state.sync.sync().await {
            Ok(count) => ApiResponse::response(ResSync::new(count)).json(),
            Err(e) => e.into_response(),
        }
    }
}

/// 路径参数解析失败时统一返回 `{"message": ...}`
fn path_code(code: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    code.map(|Path(code)| code)
        .map_err(|e| ApiError::Validation(e.body_text()))
}
