use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use babyreveal_core::{AuthError, StoreError};
use log::error;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid input")]
    Validation(#[from] ValidationErrors),
    #[error("Malformed request body")]
    MalformedBody,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid password")]
    InvalidCredentials,
    /// The detail is logged, never sent to the client
    #[error("Internal server error")]
    Internal(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedBody => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();

        let body = match &self {
            Self::Validation(errors) => json!({
                "error": self.to_string(),
                "fields": field_messages(errors),
            }),
            Self::Internal(detail) => {
                error!("Request failed: {}", detail);
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(value: StoreError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        Self::Internal(value.to_string())
    }
}

/// Flattens validation errors into `{ "fieldName": ["message", ...] }`
fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();

            (camel_case(&field.to_string()), messages)
        })
        .collect()
}

pub(crate) fn camel_case(field: &str) -> String {
    let mut result = String::with_capacity(field.len());
    let mut upper = false;

    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.push(c);
        }
    }

    result
}
