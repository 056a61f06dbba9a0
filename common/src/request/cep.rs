use serde::Deserialize;
use validator::Validate;

/// 更新 CEP 的街道与街区, 未提供的字段保持不变
#[derive(Debug, Default, Clone, Validate, Deserialize)]
pub struct ReqUpdateCep {
    #[validate(length(min = 1, message = "street must not be empty"))]
    pub street: Option<String>,
    #[validate(length(min = 1, message = "neighborhood must not be empty"))]
    pub neighborhood: Option<String>,
}

/// GET /ceps 查询参数
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReqQueryCep {
    pub favorite: Option<String>,
}

impl ReqQueryCep {
    /// Only the literal `true` / `false` narrow the listing; anything else lists everything.
    pub fn favorite(&self) -> Option<bool> {
        match self.favorite.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}
