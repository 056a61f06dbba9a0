use serde::{Deserialize, Serialize};

/// 同步结果
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResSync {
    pub message: String,
    pub count: usize,
}

impl ResSync {
    pub fn new(count: usize) -> Self {
        Self {
            message: "CEPs synchronized successfully".to_string(),
            count,
        }
    }
}
