use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use common::application::{Application, StoreBackend};
use common::error::ApiResult;

use crate::models::{CepStore, MemoryCepStore, PgCepStore};
use crate::services::{SyncService, ViaCepSource};

mod controller;
mod middleware;
mod models;
mod router;
mod services;

/// 所有 handler 共享的依赖, 启动时构造并通过 Extension 注入
pub struct AppState {
    pub store: Arc<dyn CepStore>,
    pub sync: Arc<SyncService>,
}

#[tokio::main]
async fn main() {
    let application = match Application::init() {
        Ok(application) => application,
        Err(e) => {
            eprintln!("application load err: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(application.log_level)
        .init();

    let store = match init_store(&application).await {
        Ok(store) => store,
        Err(e) => {
            error!("store init failed: {}", e);
            std::process::exit(1);
        }
    };
    let source = match ViaCepSource::new(&application.viacep) {
        Ok(source) => source,
        Err(e) => {
            error!("viacep source init failed: {}", e);
            std::process::exit(1);
        }
    };
    info!("viacep source: {}", source.url());

    let sync = Arc::new(SyncService::new(store.clone(), Arc::new(source)));
    // 初次同步失败时继续提供旧数据
    if let Err(e) = sync.sync().await {
        error!("initial sync failed, serving existing data: {}", e);
    }

    let app_state = Arc::new(AppState { store, sync });
    let addr = SocketAddr::new(application.host, application.port);

    info!("cep-server run at: {}", addr);
    let server = axum::Server::bind(&addr)
        .serve(router::routers(app_state).into_make_service())
        .with_graceful_shutdown(shutdown_signal());
    if let Err(e) = server.await {
        error!("server err: {}", e);
        std::process::exit(1);
    }
    info!("cep-server stopped");
}

async fn init_store(application: &Application) -> ApiResult<Arc<dyn CepStore>> {
    match application.store {
        StoreBackend::Postgres => {
            let pool = common::pgsql::connect(&application.postgres).await?;
            let store = PgCepStore::new(pool);
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("using in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryCepStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
