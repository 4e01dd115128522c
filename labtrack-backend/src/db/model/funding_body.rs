use diesel::{pg::Pg, prelude::*};
use garde::Validate;
use serde::{Deserialize, Serialize};
use valuable::Valuable;

use super::{impl_fetch, impl_insert};
use crate::db::schema::funding_body;

#[derive(Deserialize, Insertable, Valuable, Validate, Debug, Clone)]
#[diesel(table_name = funding_body, check_for_backend(Pg))]
pub struct NewFundingBody {
    #[garde(length(chars, min = 1, max = 255))]
    pub name: String,
}

#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = funding_body, check_for_backend(Pg))]
pub struct FundingBody {
    pub id: i32,
    pub name: String,
}

impl_insert!(NewFundingBody => FundingBody, funding_body);
impl_fetch!(FundingBody, funding_body, id: i32);
