use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use pantry_core::ItemName;
use pantry_infra::{ImageUpload, StillFrameDevice, SubmitOutcome};
use pantry_inventory::{CatalogView, PlanKind};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let items = match services.inventory().list().await {
        Ok(items) => items,
        Err(e) => return errors::service_error_to_response(e),
    };

    let mut view = CatalogView::new(items);
    if let Some(search) = query.search {
        view.set_search(search);
    }

    Json(dto::ListResponse::from(&view)).into_response()
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ItemRequest>,
) -> axum::response::Response {
    match services.inventory().submit(body.into_new_entry(), None).await {
        Ok(outcome) => submitted(outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn edit_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    Json(body): Json<dto::ItemRequest>,
) -> axum::response::Response {
    let prior = match parse_name(&name) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.inventory().submit(body.into_edit(prior), None).await {
        Ok(outcome) => submitted(outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let name = match parse_name(&name) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    match services.inventory().delete(&name).await {
        Ok(items) => Json(serde_json::json!({
            "deleted": name.as_str(),
            "items": dto::item_views(&items),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Store a photo for `name` and return its URL. The item itself is untouched;
/// clients send the URL back with the next submission.
pub async fn upload_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let name = match parse_name(&name) {
        Ok(n) => n,
        Err(resp) => return resp,
    };

    let upload = ImageUpload::new(body.to_vec(), content_type(&headers));
    match services.inventory().upload_image(&name, upload).await {
        Ok(url) => (
            StatusCode::CREATED,
            Json(dto::UploadResponse {
                url: url.as_str().to_string(),
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Body is a frame already captured by the client's camera.
pub async fn capture(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let device = StillFrameDevice::new(body.to_vec(), content_type(&headers));

    match services.inventory().capture(&device).await {
        Ok(outcome) => submitted(outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn submitted(outcome: SubmitOutcome) -> axum::response::Response {
    let status = match outcome.plan {
        PlanKind::Create | PlanKind::RenameCreate => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    (status, Json(dto::SubmitResponse::from(outcome))).into_response()
}

fn parse_name(raw: &str) -> Result<ItemName, axum::response::Response> {
    ItemName::parse(raw).map_err(errors::domain_error_to_response)
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}
