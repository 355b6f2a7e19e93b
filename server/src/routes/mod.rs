use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, with_security_headers, Config};
use crate::handlers::{
    create_event, delete_event, events_for_day, events_for_month, events_for_week, health_check,
    update_event,
};
use crate::middleware::{log_request, RequestLog};
use crate::service::EventService;

/// Calendar endpoints bound to `service`, without any middleware.
pub fn event_routes(service: EventService) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/create_event", post(create_event))
        .route("/update_event", post(update_event))
        .route("/delete_event", post(delete_event))
        .route("/events_for_day", get(events_for_day))
        .route("/events_for_week", get(events_for_week))
        .route("/events_for_month", get(events_for_month))
        .with_state(service)
}

pub fn create_routes(service: EventService, config: &Config) -> Router {
    let router = event_routes(service)
        .layer(middleware::from_fn_with_state(
            RequestLog::new(config.log_path.clone()),
            log_request,
        ))
        .layer(TraceLayer::new_for_http());

    with_security_headers(router, config.production)
        .layer(create_cors_layer(config.cors_allowed_origins.as_deref()))
}
