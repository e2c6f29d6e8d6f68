//! Success envelopes
//!
//! Every successful response is `{ "success": true, "data": ..., "message"? }`. Lists put
//! their rows under `data.items` next to a `data.pagination` block.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vesper_core::models::{Paginated, PaginationMeta};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            status: StatusCode::OK,
        }
    }

    /// 201 with the created record
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// `data` payload of a list response
#[derive(Debug, Serialize)]
pub struct PaginatedData<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> From<Paginated<T>> for PaginatedData<T> {
    fn from(page: Paginated<T>) -> Self {
        let pagination = PaginationMeta::from(&page);
        Self {
            items: page.data,
            pagination,
        }
    }
}

/// 200 with a paginated list
pub fn paginated<T: Serialize>(page: Paginated<T>) -> ApiResponse<PaginatedData<T>> {
    ApiResponse::ok(PaginatedData::from(page))
}

/// Body-less acknowledgement, e.g. after a delete
#[derive(Debug, Serialize, ToSchema)]
pub struct Acknowledgement {
    pub id: uuid::Uuid,
}

pub fn message(id: uuid::Uuid, message: impl Into<String>) -> ApiResponse<Acknowledgement> {
    ApiResponse::ok(Acknowledgement { id }).with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_core::models::PageRequest;

    #[test]
    fn paginated_envelope_shape() {
        let page = Paginated::new(vec![1, 2, 3], 23, PageRequest::from_query(Some(2), Some(3)));
        let json = serde_json::to_value(paginated(page)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["items"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["data"]["pagination"]["page"], 2);
        assert_eq!(json["data"]["pagination"]["total"], 23);
        assert_eq!(json["data"]["pagination"]["pages"], 8);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn created_uses_201() {
        let response = ApiResponse::created("x").with_message("Created").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
