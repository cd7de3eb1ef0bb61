//! Users-related HTTP API.
mod create;
mod delete;
mod get;
mod list;
mod patch;
mod update;

use axum::Router;
use axum::routing::{get, patch};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /users` goes to `list`, `POST /users` goes to `create`.
        .route("/", get(list::handler).post(create::handler))
        .route(
            "/{id}",
            get(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
        // `PATCH /users/{id}/email`.
        .route("/{id}/email", patch(patch::email))
        // `PATCH` replaces the address, `DELETE` clears it.
        .route(
            "/{id}/address",
            patch(patch::address).delete(delete::address),
        )
        .route("/{id}/phone", patch(patch::phone))
}
