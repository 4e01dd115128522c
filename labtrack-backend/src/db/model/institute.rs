use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use garde::Validate;
use serde::{Deserialize, Serialize};
use valuable::Valuable;

use super::{impl_fetch, impl_insert};
use crate::db::schema::institute;

#[derive(Deserialize, Insertable, Valuable, Validate, Debug, Clone)]
#[diesel(table_name = institute, check_for_backend(Pg))]
#[garde(allow_unvalidated)]
pub struct NewInstitute {
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
    /// The umbrella organization, if there is one
    #[garde(length(chars, min = 1, max = 255))]
    pub affiliation: Option<String>,
    #[garde(length(chars, min = 1, max = 50))]
    pub street: String,
    #[garde(length(chars, min = 1, max = 10))]
    pub postcode: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub city: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub telephone: String,
    #[garde(email)]
    pub email: String,
}

#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = institute, check_for_backend(Pg))]
pub struct Institute {
    pub id: i32,
    pub name: String,
    pub affiliation: Option<String>,
    pub street: String,
    pub postcode: String,
    pub city: String,
    pub telephone: String,
    pub email: String,
    #[valuable(skip)]
    pub date_registered: DateTime<Utc>,
}

impl_insert!(NewInstitute => Institute, institute);
impl_fetch!(Institute, institute, id: i32);
