use axum::async_trait;
use axum::extract::{Form, FromRequest, Query, Request};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::service::ServiceError;
use crate::utils::response::error as error_response;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Named string fields of a request, read from a urlencoded body and the URL
/// query, in that order. A repeated name keeps its first value and an absent
/// name reads as an empty string.
#[derive(Debug, Default)]
pub struct RequestFields(Vec<(String, String)>);

impl RequestFields {
    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map_or("", |(_, value)| value.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FieldsRejection(String);

impl From<FieldsRejection> for ServiceError {
    fn from(rejection: FieldsRejection) -> Self {
        ServiceError::InvalidRequest(rejection.0)
    }
}

impl IntoResponse for FieldsRejection {
    fn into_response(self) -> Response {
        error_response(self.0, StatusCode::BAD_REQUEST)
    }
}

fn has_form_body(request: &Request) -> bool {
    request.method() != Method::GET
        && request.method() != Method::HEAD
        && request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.starts_with(FORM_CONTENT_TYPE))
}

#[async_trait]
impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = FieldsRejection;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
            .map_err(|e| FieldsRejection(e.body_text()))?;

        let mut fields = if has_form_body(&request) {
            let Form(body) = Form::<Vec<(String, String)>>::from_request(request, state)
                .await
                .map_err(|e| FieldsRejection(e.body_text()))?;
            body
        } else {
            Vec::new()
        };

        fields.extend(query);
        Ok(RequestFields(fields))
    }
}
