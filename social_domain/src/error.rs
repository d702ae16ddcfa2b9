use crate::user::description::MAX_DESCRIPTION_LENGTH;

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::borrow::Cow;
use std::collections::HashMap;

pub type RwResult<T, E = RwError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum RwError {
    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("user does not exist")]
    CurrentUserDoesNotExist,

    #[error("user profile not found")]
    ProfileNotFound,

    #[error("{0}")]
    InvalidRequest(Cow<'static, str>),

    #[error("description is longer than 250 characters")]
    DescriptionTooLong,

    #[error("an error occurred with the database")]
    Sqlx(#[from] sqlx::Error),

    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

impl RwError {
    pub fn invalid_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::CurrentUserDoesNotExist => StatusCode::NOT_FOUND,
            Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::DescriptionTooLong => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for RwError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                self.status_code(),
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Token"))]
                    .into_iter()
                    .collect::<HeaderMap>(),
                self.to_string(),
            )
                .into_response(),
            Self::Forbidden => (self.status_code(), ()).into_response(),
            Self::CurrentUserDoesNotExist => (self.status_code(), ()).into_response(),
            Self::ProfileNotFound => (self.status_code(), ()).into_response(),
            Self::InvalidRequest(ref message) => (
                self.status_code(),
                Json(JsonError {
                    error: message.clone(),
                }),
            )
                .into_response(),
            Self::DescriptionTooLong => unprocessable_entity_with_errors([(
                "description".into(),
                vec![
                    format!("is too long (maximum is {MAX_DESCRIPTION_LENGTH} characters)").into(),
                ],
            )]),
            Self::Sqlx(ref e) => {
                tracing::error!("SQLx error: {:?}", e);
                server_error()
            }
            Self::Anyhow(ref e) => {
                tracing::error!("Generic error: {:?}", e);
                server_error()
            }
        }
    }
}

#[derive(serde::Serialize)]
struct JsonError {
    error: Cow<'static, str>,
}

#[derive(serde::Serialize)]
struct JsonErrors {
    errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
}

// Internal details stay in the log.
fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonError {
            error: "Server error".into(),
        }),
    )
        .into_response()
}

fn unprocessable_entity_with_errors(
    errors: impl Into<HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>>,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(JsonErrors {
            errors: errors.into(),
        }),
    )
        .into_response()
}
