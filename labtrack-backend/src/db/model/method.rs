use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use garde::Validate;
use serde::{Deserialize, Serialize};
use valuable::Valuable;

use super::{impl_fetch, impl_insert};
use crate::db::schema::method;

/// An experimental or manufacturing method. Its id doubles as the method code
/// embedded in sample IDs.
#[derive(Deserialize, Insertable, Valuable, Validate, Debug)]
#[diesel(table_name = method, check_for_backend(Pg))]
#[garde(allow_unvalidated)]
pub struct NewMethod {
    pub institute_id: i32,
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
}

#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = method, check_for_backend(Pg))]
pub struct Method {
    pub id: i32,
    pub institute_id: i32,
    pub name: String,
    #[valuable(skip)]
    pub date_registered: DateTime<Utc>,
}

impl_insert!(NewMethod => Method, method);
impl_fetch!(Method, method, id: i32);
