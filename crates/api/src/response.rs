use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Envelope shared by every JSON endpoint.
///
/// The payload is flattened into the envelope so that
/// `ApiResponse::ok(LoginBody { token, user })` serializes as
/// `{"success":true,"token":...,"user":...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip)]
    status: StatusCode,
}

/// Payload for message-only responses. A unit type would not flatten.
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            status: StatusCode::CREATED,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<Empty> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Body {
        token: String,
    }

    #[test]
    fn payload_is_flattened() {
        let resp = ApiResponse::ok(Body {
            token: "abc".to_owned(),
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["token"], "abc");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn message_only_omits_payload_keys() {
        let resp = ApiResponse::message("Logged out");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Logged out");
    }
}
