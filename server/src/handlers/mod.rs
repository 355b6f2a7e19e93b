use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::service::EventService;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, list, success};

mod fields;

pub use fields::{FieldsRejection, RequestFields};

/// Fields that could not be read fail the same way as fields that do not
/// parse, so every endpoint keeps its own status mapping.
type Fields = Result<RequestFields, FieldsRejection>;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "calendar-api",
    };

    success(payload).into_response()
}

/// POST /create_event
pub async fn create_event(
    State(service): State<EventService>,
    fields: Fields,
) -> Result<Response, AppError> {
    let fields = fields.map_err(|e| AppError::from_write(e.into()))?;
    let event = service
        .create_event(
            fields.get("user_id"),
            fields.get("date"),
            fields.get("title"),
            fields.get("description"),
        )
        .map_err(AppError::from_write)?;

    Ok(success(event).into_response())
}

/// POST /update_event
pub async fn update_event(
    State(service): State<EventService>,
    fields: Fields,
) -> Result<Response, AppError> {
    let fields = fields.map_err(|e| AppError::from_write(e.into()))?;
    let event = service
        .update_event(
            fields.get("user_id"),
            fields.get("event_id"),
            fields.get("date"),
            fields.get("title"),
            fields.get("description"),
        )
        .map_err(AppError::from_write)?;

    Ok(success(event).into_response())
}

/// POST /delete_event
pub async fn delete_event(
    State(service): State<EventService>,
    fields: Fields,
) -> Result<Response, AppError> {
    let fields = fields.map_err(|e| AppError::from_delete(e.into()))?;
    service
        .delete_event(fields.get("user_id"), fields.get("event_id"))
        .map_err(AppError::from_delete)?;

    Ok(empty_success().into_response())
}

/// GET /events_for_day
pub async fn events_for_day(
    State(service): State<EventService>,
    fields: Fields,
) -> Result<Response, AppError> {
    let fields = fields.map_err(|e| AppError::from_listing(e.into()))?;
    let events = service
        .events_for_day(fields.get("user_id"), fields.get("date"))
        .map_err(AppError::from_listing)?;

    Ok(list(events).into_response())
}

/// GET /events_for_week
pub async fn events_for_week(
    State(service): State<EventService>,
    fields: Fields,
) -> Result<Response, AppError> {
    let fields = fields.map_err(|e| AppError::from_listing(e.into()))?;
    let events = service
        .events_for_week(fields.get("user_id"), fields.get("date"))
        .map_err(AppError::from_listing)?;

    Ok(list(events).into_response())
}

/// GET /events_for_month
pub async fn events_for_month(
    State(service): State<EventService>,
    fields: Fields,
) -> Result<Response, AppError> {
    let fields = fields.map_err(|e| AppError::from_listing(e.into()))?;
    let events = service
        .events_for_month(fields.get("user_id"), fields.get("date"))
        .map_err(AppError::from_listing)?;

    Ok(list(events).into_response())
}
