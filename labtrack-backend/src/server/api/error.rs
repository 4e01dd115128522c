use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use diesel_async::pooled_connection::deadpool;
use labtrack_core::sample_id::SampleIdError;
use serde::Serialize;
use valuable::Valuable;

use crate::db;

#[derive(thiserror::Error, Serialize, Debug, Clone, Valuable)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Error {
    #[error(transparent)]
    Database { error: db::error::Error },
    #[error("invalid data: {reason}")]
    SimpleData { reason: String },
    #[error("malformed request: {message}")]
    MalformedRequest {
        #[serde(skip)]
        #[valuable(skip)]
        status: StatusCode,
        message: String,
    },
    #[error("no sample information schema for sample type {name}")]
    SampleTypeNotFound { name: String },
}

impl Error {
    fn status_code(&self) -> StatusCode {
        use db::error::Error::{
            DuplicateRecord, InvalidSampleType, Other, RecordNotFound, ReferenceNotFound, SampleId,
            SampleInfo,
        };

        match self {
            Self::SimpleData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SampleTypeNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MalformedRequest { status, .. } => *status,
            Self::Database { error } => match error {
                Other { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                DuplicateRecord { .. } => StatusCode::CONFLICT,
                RecordNotFound => StatusCode::NOT_FOUND,
                SampleId {
                    error: SampleIdError::LookupUnavailable { .. },
                } => StatusCode::SERVICE_UNAVAILABLE,
                ReferenceNotFound { .. }
                | InvalidSampleType { .. }
                | SampleId { .. }
                | SampleInfo { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }

    pub(super) fn malformed(status: StatusCode, message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            status,
            message: message.into(),
        }
    }
}

impl From<db::error::Error> for Error {
    fn from(error: db::error::Error) -> Self {
        Self::Database { error }
    }
}

impl From<JsonRejection> for Error {
    fn from(err: JsonRejection) -> Self {
        Self::malformed(err.status(), err.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(err: QueryRejection) -> Self {
        Self::malformed(err.status(), format!("{err:#}"))
    }
}

impl From<PathRejection> for Error {
    fn from(err: PathRejection) -> Self {
        Self::malformed(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(err: MultipartRejection) -> Self {
        Self::malformed(err.status(), err.body_text())
    }
}

impl From<MultipartError> for Error {
    fn from(err: MultipartError) -> Self {
        Self::malformed(err.status(), err.body_text())
    }
}

impl From<deadpool::PoolError> for Error {
    fn from(err: deadpool::PoolError) -> Self {
        Self::from(db::error::Error::from(err))
    }
}

impl From<garde::Report> for Error {
    fn from(err: garde::Report) -> Self {
        Self::SimpleData {
            reason: format!("{err:#}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            status: u16,
            error: Option<Error>,
        }

        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = self.as_value());
        } else {
            tracing::info!(error = self.as_value());
        }

        // Internal details stay in the logs
        let error = (status != StatusCode::INTERNAL_SERVER_ERROR).then_some(self);

        (
            status,
            axum::Json(ErrorResponse {
                status: status.as_u16(),
                error,
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use labtrack_core::sample_info::{FieldError, FieldErrorMap, SampleInfoError};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    async fn response_json(err: Error) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    fn invalid_fields() -> db::error::Error {
        let mut fields = FieldErrorMap::default();
        fields.insert("weight_in_g", FieldError::RequiredFieldMissing);

        SampleInfoError::from(fields).into()
    }

    #[rstest]
    #[case(SampleIdError::Format.into(), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(SampleIdError::LookupUnavailable { message: "connection reset".to_string() }.into(), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(invalid_fields(), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(db::error::Error::InvalidSampleType { sample_type_id: 9 }, StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(db::error::Error::RecordNotFound, StatusCode::NOT_FOUND)]
    #[case(db::error::Error::DuplicateRecord { entity: "staff".to_string(), field: None, value: None }, StatusCode::CONFLICT)]
    #[case(db::error::Error::Other { message: "boom".to_string() }, StatusCode::INTERNAL_SERVER_ERROR)]
    #[tokio::test]
    async fn database_error_status(
        #[case] error: db::error::Error,
        #[case] expected: StatusCode,
    ) {
        let (status, body) = response_json(error.into()).await;

        assert_eq!(status, expected);
        assert_eq!(body["status"], json!(expected.as_u16()));
    }

    #[tokio::test]
    async fn sample_info_error_body() {
        let (_, body) = response_json(invalid_fields().into()).await;

        assert_eq!(
            body,
            json!({
                "status": 422,
                "error": {
                    "type": "database",
                    "error": {
                        "type": "sample_info",
                        "error": {
                            "type": "invalid_fields",
                            "fields": {"weight_in_g": ["this field is required"]}
                        }
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn internal_errors_are_hidden() {
        let err = db::error::Error::Other {
            message: "password authentication failed".to_string(),
        };
        let (_, body) = response_json(err.into()).await;

        assert_eq!(body, json!({"status": 500, "error": null}));
    }

    #[tokio::test]
    async fn malformed_request_keeps_status() {
        let err = Error::malformed(StatusCode::BAD_REQUEST, "missing field `sample_info`");
        let (status, body) = response_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            json!({"type": "malformed_request", "message": "missing field `sample_info`"})
        );
    }
}
