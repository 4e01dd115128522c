use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use garde::Validate;
use serde::{Deserialize, Serialize};
use valuable::Valuable;

use super::{impl_fetch, impl_insert};
use crate::db::schema::staff;

#[derive(Deserialize, Insertable, Valuable, Validate, Debug)]
#[diesel(table_name = staff, check_for_backend(Pg))]
#[garde(allow_unvalidated)]
pub struct NewStaff {
    pub institute_id: i32,
    #[garde(length(chars, min = 1, max = 255))]
    pub first_name: String,
    #[garde(length(chars, min = 1, max = 255))]
    pub last_name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub telephone: String,
    /// Whether this person is currently employed
    #[serde(default)]
    pub active: bool,
}

#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = staff, check_for_backend(Pg))]
pub struct Staff {
    pub id: i32,
    pub institute_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
    pub active: bool,
    #[valuable(skip)]
    pub date_registered: DateTime<Utc>,
}

impl_insert!(NewStaff => Staff, staff);
impl_fetch!(Staff, staff, id: i32);
