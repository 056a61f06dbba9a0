use std::collections::HashMap;
use std::fmt::Display;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::Level;

use crate::error::{ApiError, ApiResult};

/// 记录存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Application {
    // 服务监听地址
    pub host: IpAddr,
    // 服务端口
    pub port: u16,
    pub log_level: Level,
    pub store: StoreBackend,
    pub postgres: PostgresConfig,
    pub viacep: ViaCepConfig,
}

impl Application {
    /// 读取 `.env` 与进程环境变量
    pub fn init() -> ApiResult<Self> {
        dotenv::dotenv().ok();
        let vars = dotenv::vars().collect::<HashMap<String, String>>();

        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> ApiResult<Self> {
        let store = Self::analysis_or("CEP_STORE", vars, StoreBackend::Postgres)?;
        let url = match (store, vars.get("DATABASE_URL")) {
            (_, Some(url)) => url.clone(),
            (StoreBackend::Memory, None) => String::new(),
            (StoreBackend::Postgres, None) => {
                return Err(ApiError::Config("DATABASE_URL is not set".to_string()))
            }
        };

        Ok(Application {
            host: Self::analysis_or("HOST", vars, IpAddr::from([0, 0, 0, 0]))?,
            port: Self::analysis_or("PORT", vars, 3000u16)?,
            log_level: Self::analysis_or("LOG_LEVEL", vars, Level::INFO)?,
            store,
            postgres: PostgresConfig {
                url,
                pool_size: Self::analysis_or("DATABASE_POOL_SIZE", vars, 5u32)?,
                acquire_timeout: Duration::from_secs(Self::analysis_or(
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    vars,
                    5u64,
                )?),
            },
            viacep: ViaCepConfig {
                base_url: Self::analysis_or(
                    "VIACEP_BASE_URL",
                    vars,
                    "https://viacep.com.br/ws".to_string(),
                )?,
                uf: Self::analysis_or("VIACEP_UF", vars, "RS".to_string())?,
                city: Self::analysis_or("VIACEP_CITY", vars, "Porto Alegre".to_string())?,
                street: Self::analysis_or("VIACEP_STREET", vars, "Domingos".to_string())?,
                timeout: Duration::from_secs(Self::analysis_or("VIACEP_TIMEOUT_SECS", vars, 5u64)?),
            },
        })
    }

    fn analysis_or<T>(key: &str, vars: &HashMap<String, String>, default: T) -> ApiResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match vars.get(key) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map_err(|e| ApiError::Config(format!("{}={:?}: {}", key, value, e))),
            None => Ok(default),
        }
    }
}

/// postgres 数据库配置参数
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout: Duration,
}

/// ViaCEP 查询参数, 每次同步都使用同一个固定查询
#[derive(Debug, Clone)]
pub struct ViaCepConfig {
    pub base_url: String,
    pub uf: String,
    pub city: String,
    pub street: String,
    pub timeout: Duration,
}
