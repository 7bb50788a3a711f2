// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::vault::VaultError;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AppError {
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not implemented")]
    NotImplemented,
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("request timed out")]
    Timeout,
    #[error("service overloaded")]
    Overloaded,
    #[error("internal server error")]
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::NotImplemented => (StatusCode::NOT_IMPLEMENTED, "Not implemented".to_string()),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            Self::Timeout => (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string()),
            Self::Overloaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service overloaded, try again later".to_string(),
            ),
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
        };

        let body = Json(json!({"code": status.as_u16(), "message": message}));

        (status, body).into_response()
    }
}

impl From<VaultError> for AppError {
    fn from(source: VaultError) -> Self {
        match source {
            VaultError::Http { status, message } => match status {
                400 => AppError::ValidationError(message),
                401 => AppError::Unauthorized,
                403 => AppError::Forbidden,
                404 => AppError::NotFound(message),
                409 => AppError::Conflict(message),
                501 => AppError::NotImplemented,
                _ => {
                    tracing::error!("[service] vault returned HTTP {}: {}", status, message);
                    AppError::BadGateway(format!("vault returned HTTP {status}"))
                }
            },
            VaultError::Transport(err) => {
                tracing::error!("[service] vault unreachable: {:?}", err);
                AppError::BadGateway("vault service unreachable".to_string())
            }
            VaultError::InvalidResponse(msg) => {
                tracing::error!("[service] invalid vault response: {}", msg);
                AppError::BadGateway("invalid vault response".to_string())
            }
            VaultError::Config(msg) => {
                tracing::error!("[service] vault client misconfigured: {}", msg);
                AppError::InternalServerError
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let (status, json) = body_of(AppError::ValidationError("bad id".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 400);
        assert_eq!(json["message"], "bad id");
    }

    #[tokio::test]
    async fn test_payload_too_large_body() {
        let (status, json) = body_of(AppError::PayloadTooLarge).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["code"], 413);
    }

    #[test]
    fn test_vault_status_translation() {
        let http = |status| VaultError::Http {
            status,
            message: "nope".to_string(),
        };
        assert_eq!(AppError::from(http(400)), AppError::ValidationError("nope".to_string()));
        assert_eq!(AppError::from(http(401)), AppError::Unauthorized);
        assert_eq!(AppError::from(http(403)), AppError::Forbidden);
        assert_eq!(AppError::from(http(404)), AppError::NotFound("nope".to_string()));
        assert_eq!(AppError::from(http(409)), AppError::Conflict("nope".to_string()));
        assert_eq!(AppError::from(http(501)), AppError::NotImplemented);
        assert!(matches!(AppError::from(http(500)), AppError::BadGateway(_)));
    }

    #[tokio::test]
    async fn test_bad_gateway_hides_vault_detail() {
        let error = AppError::from(VaultError::InvalidResponse("secret detail".to_string()));
        let (status, json) = body_of(error).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["message"], "invalid vault response");
    }
}
