use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::{credentials::CredentialError, repo::StoreError};

/// Errors surfaced to API clients. Every variant renders through the same
/// `{"message": ...}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<&'static str>,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<&'static str>>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Credential(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Conflict("User already exists".into()),
            StoreError::Backend(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Validation { message, fields } => ErrorBody {
                message,
                fields: (!fields.is_empty()).then_some(fields),
            },
            Self::Credential(e) => {
                error!(error = %e, "credential check failed");
                ErrorBody {
                    message: "Internal server error".into(),
                    fields: None,
                }
            }
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                ErrorBody {
                    message: "Internal server error".into(),
                    fields: None,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                fields: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
