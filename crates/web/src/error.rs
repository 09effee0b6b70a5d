use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt;
use storage::error::{Rejection, StorageError};
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

fn rejection_status(rejection: &Rejection) -> StatusCode {
    match rejection {
        Rejection::BadRound { .. } | Rejection::EmptyReason => StatusCode::BAD_REQUEST,
        _ => StatusCode::CONFLICT,
    }
}

/// The serialized rejection with a readable `message` next to its fields.
fn rejection_body(rejection: &Rejection) -> Value {
    let mut body = serde_json::to_value(rejection).unwrap_or_else(|_| json!({ "kind": rejection.kind() }));

    if let Value::Object(fields) = &mut body {
        fields.insert("error".to_string(), json!(rejection.to_string()));
        fields.insert("message".to_string(), json!(rejection.to_string()));
        if let Some(limit_type) = rejection.limit_type() {
            fields.insert("limit_type".to_string(), json!(limit_type));
        }
    }

    body
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::Rejected(rejection)) => rejection_status(rejection),
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound { resource, id }) => {
                json!({
                    "error": format!("{resource} not found"),
                    "resource": resource,
                    "id": id
                })
            }
            Self::Storage(StorageError::Rejected(rejection)) => {
                tracing::debug!(kind = rejection.kind(), "Request rejected");
                rejection_body(rejection)
            }
            Self::Storage(StorageError::ConstraintViolation(msg))
            | Self::Storage(StorageError::InvalidInput(msg)) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::error::{GroupConstraint, Resource};

    async fn body_json(error: WebError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let error = WebError::from(StorageError::not_found(Resource::Event, "abc"));

        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["resource"], "event");
        assert_eq!(body["id"], "abc");
    }

    #[tokio::test]
    async fn test_quota_rejection_is_conflict_with_fields() {
        let error = WebError::from(StorageError::from(Rejection::StudentQuota {
            current: 3,
            limit: 3,
        }));

        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "student_quota");
        assert_eq!(body["limit_type"], "student");
        assert_eq!(body["limit"], 3);
        assert!(body["message"].as_str().unwrap().contains("3/3"));
    }

    #[tokio::test]
    async fn test_group_rejection_names_constraint() {
        let error = WebError::from(StorageError::from(Rejection::GroupIneligible {
            constraint: GroupConstraint::Gender,
        }));

        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["constraint"], "gender");
    }

    #[test]
    fn test_input_rejections_are_bad_requests() {
        let bad_round = WebError::from(StorageError::from(Rejection::BadRound {
            round: "semi".to_string(),
        }));
        let empty_reason = WebError::from(StorageError::from(Rejection::EmptyReason));
        let bad_table = WebError::from(StorageError::InvalidInput("rank 0".to_string()));

        assert_eq!(bad_round.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(empty_reason.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(bad_table.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_reference_rejection_is_conflict() {
        let error = WebError::from(StorageError::from(Rejection::ReferenceExists {
            resource: Resource::Registration,
            count: 4,
        }));

        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_database_error_is_hidden() {
        let error = WebError::from(StorageError::Database(sqlx::Error::PoolTimedOut));

        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }
}
