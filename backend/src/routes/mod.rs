mod comment;
mod docs;
mod health;
mod personas;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

use crate::types::Environment;

/// Creates the router with all handler routes
pub fn handler(environment: Environment) -> ApiRouter {
    let router = ApiRouter::new()
        .api_route("/health", get(health::handler))
        .api_route("/comment", post(comment::handler))
        .api_route(
            "/personas",
            get(personas::list_builtins).post(personas::upload),
        )
        .api_route("/personas/marketplace", get(personas::marketplace))
        .api_route("/personas/{id}", get(personas::get_custom));

    if environment.show_api_docs() {
        router.merge(docs::handler())
    } else {
        router
    }
}
