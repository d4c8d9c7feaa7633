use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: ApiError,
}

impl AppError {
    fn new(status: StatusCode, code: &str, msg: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiError {
                error: code.into(),
                message: msg.into(),
            },
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
    }

    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR", msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let err = AppError::misconfigured("Subscription ID is required");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["error"], "CONFIGURATION_ERROR");
        assert_eq!(json["message"], "Subscription ID is required");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_bad_request_status() {
        let err = AppError::bad_request("timePeriod must be a number");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "BAD_REQUEST");
    }
}
