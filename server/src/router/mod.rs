use std::sync::Arc;

use axum::middleware as AxumMiddleware;
use axum::{Extension, Router};

use crate::{middleware, AppState};

mod cep;

pub fn routers(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", Router::new().merge(cep::ceps()))
        .layer(Extension(state))
        .layer(AxumMiddleware::from_fn(middleware::cors_guard))
}
