//! Success envelopes.
//!
//! Listings answer with `page`, `limit`, a `total<Resource>` count and
//! `totalPages` beside the resource array; single-resource answers carry the
//! resource under its own name. The failure envelope lives with the error
//! type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::pagination::PageMetadata;

fn respond(status: StatusCode, body: Map<String, Value>) -> Response {
    let mut response = Json(Value::Object(body)).into_response();
    *response.status_mut() = status;
    response
}

/// `{ success, <name>: item }`
pub fn resource<T: Serialize>(name: &str, item: &T) -> Result<Response> {
    let mut body = Map::new();
    body.insert("success".to_string(), json!(true));
    body.insert(name.to_string(), serde_json::to_value(item)?);
    Ok(respond(StatusCode::OK, body))
}

/// `{ success, message, <name>: item }` with the given status.
pub fn resource_with_message<T: Serialize>(
    status: StatusCode,
    message: &str,
    name: &str,
    item: &T,
) -> Result<Response> {
    let mut body = Map::new();
    body.insert("success".to_string(), json!(true));
    body.insert("message".to_string(), json!(message));
    body.insert(name.to_string(), serde_json::to_value(item)?);
    Ok(respond(status, body))
}

/// `{ success, message }`
pub fn message(text: &str) -> Response {
    let mut body = Map::new();
    body.insert("success".to_string(), json!(true));
    body.insert("message".to_string(), json!(text));
    respond(StatusCode::OK, body)
}

/// `{ success, page, limit, <total_label>, totalPages, <name>: items }`
pub fn list<T: Serialize>(
    name: &str,
    total_label: &str,
    items: &[T],
    meta: &PageMetadata,
) -> Result<Response> {
    let mut body = Map::new();
    body.insert("success".to_string(), json!(true));
    body.insert("page".to_string(), json!(meta.page));
    body.insert("limit".to_string(), json!(meta.per_page));
    body.insert(total_label.to_string(), json!(meta.total_items));
    body.insert("totalPages".to_string(), json!(meta.total_pages));
    body.insert(name.to_string(), serde_json::to_value(items)?);
    Ok(respond(StatusCode::OK, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::OffsetPagination;

    #[test]
    fn test_list_envelope_keys() {
        let meta = OffsetPagination::new(1, 10).metadata(25);
        let response = list("sellers", "totalSellers", &["a", "b"], &meta).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_message_envelope() {
        let response = message("Logged out successfully");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
