use chrono::{DateTime, NaiveDate, Utc};
use diesel::{pg::Pg, prelude::*};
use garde::Validate;
use labtrack_core::sample_id::SampleId;
use serde::{Deserialize, Serialize};
use valuable::Valuable;

use super::{impl_fetch, impl_insert};
use crate::db::schema::experiment;

#[derive(Deserialize, Insertable, Valuable, Validate, Debug)]
#[diesel(table_name = experiment, check_for_backend(Pg))]
#[garde(allow_unvalidated)]
pub struct NewExperiment {
    #[garde(custom(is_sample_id))]
    pub sample_id: String,
    pub method_id: i32,
    pub staff_id: i32,
    pub project_id: i32,
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
    #[valuable(skip)]
    pub date_created: NaiveDate,
}

// Shape only. Whether the sample exists is up to the foreign key
fn is_sample_id(sample_id: &str, _: &()) -> garde::Result {
    SampleId::parse(sample_id)
        .map(|_| ())
        .map_err(|e| garde::Error::new(e.to_string()))
}

#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = experiment, check_for_backend(Pg))]
pub struct Experiment {
    pub id: i32,
    pub sample_id: String,
    pub method_id: i32,
    pub staff_id: i32,
    pub project_id: i32,
    pub name: String,
    #[valuable(skip)]
    pub date_created: NaiveDate,
    #[valuable(skip)]
    pub date_registered: DateTime<Utc>,
}

impl_insert!(NewExperiment => Experiment, experiment);
impl_fetch!(Experiment, experiment, id: i32);
