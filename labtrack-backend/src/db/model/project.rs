use chrono::{DateTime, NaiveDate, Utc};
use diesel::{pg::Pg, prelude::*};
use garde::Validate;
use serde::{Deserialize, Serialize};
use valuable::Valuable;

use super::{impl_fetch, impl_insert};
use crate::db::schema::project;

#[derive(Deserialize, Insertable, Valuable, Validate, Debug)]
#[diesel(table_name = project, check_for_backend(Pg))]
#[garde(allow_unvalidated)]
pub struct NewProject {
    pub funding_body_id: i32,
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub abbreviation: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub funding_number: String,
    #[valuable(skip)]
    pub funding_period_start: NaiveDate,
    #[valuable(skip)]
    #[garde(custom(|end: &NaiveDate, _| not_before(end, &self.funding_period_start)))]
    pub funding_period_end: NaiveDate,
}

fn not_before(end: &NaiveDate, start: &NaiveDate) -> garde::Result {
    if end < start {
        return Err(garde::Error::new(format!(
            "funding period cannot end ({end}) before it starts ({start})"
        )));
    }

    Ok(())
}

#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = project, check_for_backend(Pg))]
pub struct Project {
    pub id: i32,
    pub funding_body_id: i32,
    pub name: String,
    pub abbreviation: String,
    pub funding_number: String,
    #[valuable(skip)]
    pub funding_period_start: NaiveDate,
    #[valuable(skip)]
    pub funding_period_end: NaiveDate,
    #[valuable(skip)]
    pub date_registered: DateTime<Utc>,
}

impl_insert!(NewProject => Project, project);
impl_fetch!(Project, project, id: i32);
