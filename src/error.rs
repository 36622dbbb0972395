// src/error.rs

use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Field name -> messages, the shape clients get for invalid input.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const READ_ONLY_DETAIL: &str = "The server is running in read-only mode; changes are disabled.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed field validation.
    #[error("invalid input: {0:?}")]
    Validation(FieldErrors),

    /// Request body could not be decoded.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// A business rule rejected the request.
    #[error("{0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("read-only mode")]
    ReadOnly,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Malformed(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::ReadOnly => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            ApiError::Validation(errors) => builder.json(errors),
            ApiError::Malformed(detail) => builder.json(json!({ "detail": detail })),
            ApiError::BadRequest(message) => builder.json(json!({ "error": message })),
            ApiError::NotFound => builder.json(json!({ "detail": "Not found." })),
            ApiError::ReadOnly => builder.json(json!({ "detail": READ_ONLY_DETAIL })),
            ApiError::Database(e) => {
                log::error!("database error: {e}");
                builder.json(json!({ "error": "internal server error" }))
            }
            ApiError::Internal(e) => {
                log::error!("internal error: {e}");
                builder.json(json!({ "error": "internal server error" }))
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        flatten_validation_errors("", &errors, &mut out);
        ApiError::Validation(out)
    }
}

fn flatten_validation_errors(prefix: &str, errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(key).or_default();
                for e in list {
                    messages.push(
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("invalid value ({})", e.code)),
                    );
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_validation_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_validation_errors(&format!("{key}[{index}]"), inner, out);
                }
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        let (code, constraint, message) = match &e {
            sqlx::Error::Database(db) => (
                db.code().map(|c| c.into_owned()),
                db.constraint().unwrap_or_default().to_string(),
                db.message().to_string(),
            ),
            sqlx::Error::RowNotFound => return ApiError::NotFound,
            _ => return ApiError::Database(e),
        };

        match code.as_deref() {
            // unique_violation
            Some("23505") => match constraint.as_str() {
                "membership_types_name_key" => {
                    ApiError::field("name", "membership type with this name already exists.")
                }
                "users_username_key" => {
                    ApiError::field("username", "A user with that username already exists.")
                }
                _ => ApiError::BadRequest("duplicate value".into()),
            },
            // foreign_key_violation
            Some("23503") => match constraint.as_str() {
                "user_memberships_membership_type_id_fkey" => ApiError::BadRequest(
                    "membership type is referenced by member memberships".into(),
                ),
                "user_memberships_user_id_fkey" => {
                    ApiError::field("user", "invalid pk - object does not exist.")
                }
                "ventas_cliente_id_fkey" => {
                    ApiError::field("cliente", "invalid pk - object does not exist.")
                }
                _ => ApiError::BadRequest("referenced record does not exist".into()),
            },
            // check_violation
            Some("23514") => match constraint.as_str() {
                "productos_stock_check" => ApiError::field("stock", "stock cannot be negative"),
                "user_memberships_period_check" => {
                    ApiError::field("end_date", "end_date must be on or after start_date")
                }
                "membership_types_duration_check" => {
                    ApiError::field("duration_days", "must be zero or greater")
                }
                _ => ApiError::BadRequest(message),
            },
            _ => ApiError::Database(e),
        }
    }
}
