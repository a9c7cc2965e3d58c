use axum::{
    Router,
    routing::{get, post, put},
};

pub mod items;
pub mod system;

/// Router for the inventory endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/:name", put(items::edit_item).delete(items::delete_item))
        .route("/items/:name/image", post(items::upload_image))
        .route("/capture", post(items::capture))
}
