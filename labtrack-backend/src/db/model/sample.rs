use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{dsl::max, pg::Pg, prelude::*};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use garde::Validate;
use labtrack_core::{
    sample_id::{self, KnownCodes, SampleIdError},
    sample_info,
};
use serde::Serialize;
use valuable::Valuable;

use super::{Write, impl_fetch, sample_type};
use crate::db::{
    error::{self, Error},
    schema::{institute, method, sample},
};

/// A sample as submitted by a client, before its ID and metadata document have
/// been checked.
#[derive(Validate, Valuable, Debug)]
#[garde(allow_unvalidated)]
pub struct SampleSubmission {
    pub sample_id: String,
    pub institute_id: i32,
    pub method_id: Option<i32>,
    pub project_id: i32,
    pub sample_type_id: i32,
    pub parent_id: Option<String>,
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
    #[valuable(skip)]
    pub date_created: NaiveDate,
    /// The uploaded sample-info document, undecoded
    #[valuable(skip)]
    pub sample_info: Bytes,
    /// The date against which the sample ID's date must lie in the past
    #[valuable(skip)]
    pub today: NaiveDate,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = sample, check_for_backend(Pg))]
struct NewSample {
    sample_id: String,
    institute_id: i32,
    method_id: Option<i32>,
    project_id: i32,
    sample_type_id: i32,
    parent_id: Option<String>,
    name: String,
    date_created: NaiveDate,
    sample_info: serde_json::Value,
}

#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = sample, check_for_backend(Pg))]
pub struct Sample {
    pub sample_id: String,
    pub institute_id: i32,
    pub method_id: Option<i32>,
    pub project_id: i32,
    pub sample_type_id: i32,
    pub parent_id: Option<String>,
    pub name: String,
    #[valuable(skip)]
    pub date_created: NaiveDate,
    #[valuable(skip)]
    pub sample_info: serde_json::Value,
    #[valuable(skip)]
    pub date_registered: DateTime<Utc>,
}

impl_fetch!(Sample, sample, sample_id: String);

/// The highest institute and method ids currently in the database.
async fn known_codes(db_conn: &mut AsyncPgConnection) -> Result<KnownCodes, SampleIdError> {
    let lookup_unavailable = |err: diesel::result::Error| SampleIdError::LookupUnavailable {
        message: err.to_string(),
    };

    let institute: Option<i32> = institute::table
        .select(max(institute::id))
        .first(db_conn)
        .await
        .map_err(lookup_unavailable)?;

    let method: Option<i32> = method::table
        .select(max(method::id))
        .first(db_conn)
        .await
        .map_err(lookup_unavailable)?;

    Ok(KnownCodes::new(
        institute.unwrap_or_default(),
        method.unwrap_or_default(),
    ))
}

impl Write for SampleSubmission {
    type Returns = Sample;

    async fn write(self, db_conn: &mut AsyncPgConnection) -> error::Result<Self::Returns> {
        let Self {
            sample_id,
            institute_id,
            method_id,
            project_id,
            sample_type_id,
            parent_id,
            name,
            date_created,
            sample_info,
            today,
        } = self;

        let known_codes = known_codes(db_conn).await?;
        let sample_id = sample_id::validate(&sample_id, &known_codes, today)?;

        let Some(sample_type_name) = sample_type::name_of(sample_type_id, db_conn).await? else {
            return Err(Error::InvalidSampleType { sample_type_id });
        };
        let record = sample_info::validate_sample_info(&sample_type_name, &sample_info)?;

        tracing::debug!(
            sample_id = sample_id.as_str(),
            schema = record.schema().name(),
            "validated sample submission"
        );

        let new_sample = NewSample {
            sample_id: sample_id.into(),
            institute_id,
            method_id,
            project_id,
            sample_type_id,
            parent_id,
            name,
            date_created,
            sample_info: record.to_json(),
        };

        let inserted = diesel::insert_into(sample::table)
            .values(new_sample)
            .returning(Sample::as_returning())
            .get_result(db_conn)
            .await?;

        Ok(inserted)
    }
}
