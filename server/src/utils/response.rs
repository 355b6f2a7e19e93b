use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub result: T,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// `200 {"result": data}`
pub fn success<T>(data: T) -> impl IntoResponse
where
    T: Serialize,
{
    (StatusCode::OK, Json(ApiResponse { result: data }))
}

/// `200` with a bare JSON body, used for listings.
pub fn list<T>(items: Vec<T>) -> impl IntoResponse
where
    T: Serialize,
{
    (StatusCode::OK, Json(items))
}

/// `200` with no body.
pub fn empty_success() -> impl IntoResponse {
    StatusCode::OK
}

pub fn error(message: impl Into<String>, status: StatusCode) -> Response {
    let body = ApiErrorResponse {
        error: message.into(),
    };

    (status, Json(body)).into_response()
}
