use std::sync::LazyLock;

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use diesel_async::pooled_connection::deadpool;
use labtrack_core::{sample_id::SampleIdError, sample_info::SampleInfoError};
use regex::Regex;
use serde::Serialize;
use valuable::Valuable;

// Postgres reports the offending column and value as `Key (column)=(value) ...`
static DETAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Key \((.+)\)=\((.+)\).+").unwrap());

#[derive(thiserror::Error, Debug, Serialize, Valuable, Clone)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Error {
    #[error("{entity} with {} = {} already exists", field.clone().unwrap_or_default(), value.clone().unwrap_or_default())]
    DuplicateRecord {
        entity: String,
        field: Option<String>,
        value: Option<String>,
    },
    #[error("unable to create reference between {entity} and {referenced_entity}: {} not found", value.clone().unwrap_or_default())]
    ReferenceNotFound {
        entity: String,
        referenced_entity: String,
        value: Option<String>,
    },
    #[error("record not found")]
    RecordNotFound,
    #[error("invalid sample type {sample_type_id}")]
    InvalidSampleType { sample_type_id: i32 },
    #[error(transparent)]
    SampleId { error: SampleIdError },
    #[error(transparent)]
    SampleInfo { error: SampleInfoError },
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    fn from_other_error(err: impl std::error::Error) -> Self {
        Self::Other {
            message: format!("{err:?}"),
        }
    }
}

impl From<SampleIdError> for Error {
    fn from(error: SampleIdError) -> Self {
        Self::SampleId { error }
    }
}

impl From<SampleInfoError> for Error {
    fn from(error: SampleInfoError) -> Self {
        Self::SampleInfo { error }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error::{DatabaseError, NotFound};
        match err {
            DatabaseError(kind, info) => Self::from((kind, info)),
            NotFound => Self::RecordNotFound,
            _ => Self::from_other_error(err),
        }
    }
}

impl From<deadpool::PoolError> for Error {
    fn from(err: deadpool::PoolError) -> Self {
        Self::from_other_error(err)
    }
}

impl From<diesel::ConnectionError> for Error {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::from_other_error(err)
    }
}

impl From<(DatabaseErrorKind, Box<dyn DatabaseErrorInformation + Send + Sync>)> for Error {
    fn from(
        (kind, info): (DatabaseErrorKind, Box<dyn DatabaseErrorInformation + Send + Sync>),
    ) -> Self {
        use DatabaseErrorKind::{ForeignKeyViolation, UniqueViolation};

        let entity = info.table_name().unwrap_or_default().to_string();
        let details = info.details().unwrap_or_default();

        let captures = DETAIL_PATTERN.captures(details);
        let capture = |i| {
            captures
                .as_ref()
                .and_then(|c| c.get(i))
                .map(|m| m.as_str().to_string())
        };
        let (field, value) = (capture(1), capture(2));

        match kind {
            UniqueViolation => Self::DuplicateRecord {
                entity,
                field,
                value,
            },
            ForeignKeyViolation => {
                // `... is not present in table "institute".`
                let referenced_entity = details
                    .split_whitespace()
                    .last()
                    .unwrap_or_default()
                    .trim_end_matches('.')
                    .replace('"', "");

                Self::ReferenceNotFound {
                    entity,
                    referenced_entity,
                    value,
                }
            }
            _ => Self::from_other_error(diesel::result::Error::DatabaseError(kind, info)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
