/// Uniform response envelope
///
/// Every endpoint, successful or not, answers with
/// `{"code": <status>, "message": <text>, "data": <payload or null>}`.

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    /// 200 response carrying `data`
    pub fn ok(message: impl Into<String>, data: T) -> HttpResponse {
        HttpResponse::Ok().json(Self::new(StatusCode::OK, message, Some(data)))
    }
}

/// 200 response with `data: null`
pub fn ok_without_data(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::<()>::new(StatusCode::OK, message, None))
}
