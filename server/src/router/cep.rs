use axum::routing::{get, patch, post};
use axum::Router;

use crate::controller::cep::CepController;

pub fn ceps() -> Router {
    Router::new().nest(
        "/ceps",
        Router::new()
            .route("/", get(CepController::list_ceps))
            .route("/sync", post(CepController::sync_ceps))
            .route(
                "/:code",
                get(CepController::get_cep).put(CepController::update_cep),
            )
            .route("/:code/favorite", patch(CepController::toggle_favorite)),
    )
}
