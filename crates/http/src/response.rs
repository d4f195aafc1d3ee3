//! Success and fail envelopes shared by every JSON endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Outcome marker carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// Wire shape `{status, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl Envelope<()> {
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Successful response paired with its HTTP status code.
#[derive(Debug)]
pub struct ApiResponse<T = ()> {
    code: StatusCode,
    message: Option<String>,
    data: Option<T>,
}

impl ApiResponse<()> {
    /// Success carrying only a message.
    pub fn message(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Success carrying a data payload.
    pub fn data(code: StatusCode, data: T) -> Self {
        Self {
            code,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            status: Status::Success,
            message: self.message,
            data: self.data,
        };
        (self.code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_only_envelope_omits_data() {
        let body = Envelope::<()> {
            status: Status::Success,
            message: Some("done".to_string()),
            data: None,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"status": "success", "message": "done"})
        );
    }

    #[test]
    fn fail_envelope_shape() {
        assert_eq!(
            serde_json::to_value(Envelope::fail("nope")).unwrap(),
            json!({"status": "fail", "message": "nope"})
        );
    }

    #[test]
    fn data_response_keeps_status_code() {
        let response = ApiResponse::data(StatusCode::CREATED, json!({"id": 1})).with_message("ok");
        assert_eq!(response.code(), StatusCode::CREATED);
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
    }
}
