//! Route table.

use crate::{Gateway, assets, controller};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use engine::Engine;

/// Build the axum router for the gateway.
///
/// `body_limit` caps request bodies; an oversized upload is decoded as a
/// failed read and answered like any other undecodable request.
pub fn router<E: Engine + 'static>(state: Gateway<E>, body_limit: usize) -> Router {
    // Id-less paths reach the handlers too, so they answer with a
    // missing-id error instead of an empty 404.
    let dataset = put(controller::put_dataset::<E>).delete(controller::delete_dataset::<E>);
    Router::new()
        .route("/", get(controller::index))
        .route("/datasets", get(controller::list_datasets::<E>))
        .route("/dataset", dataset.clone())
        .route("/dataset/", dataset.clone())
        .route("/dataset/{id}", dataset)
        .route("/query", post(controller::run_query::<E>))
        .route("/public/{*path}", get(assets::public_file::<E>))
        .route("/{name}", get(assets::named_file::<E>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
