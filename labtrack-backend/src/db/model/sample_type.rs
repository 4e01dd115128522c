use diesel::{pg::Pg, prelude::*};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use valuable::Valuable;

use super::impl_fetch;
use crate::db::{error, schema::sample_type};

/// Sample types are fixed by the database migrations, so they can only be read.
#[derive(Serialize, Selectable, Queryable, Valuable, Debug)]
#[diesel(table_name = sample_type, check_for_backend(Pg))]
pub struct SampleType {
    pub id: i32,
    pub name: String,
}

impl_fetch!(SampleType, sample_type, id: i32);

/// The name of the sample type with `id`, or `None` if there isn't one.
pub(super) async fn name_of(
    id: i32,
    db_conn: &mut AsyncPgConnection,
) -> error::Result<Option<String>> {
    Ok(sample_type::table
        .find(id)
        .select(sample_type::name)
        .first(db_conn)
        .await
        .optional()?)
}

#[cfg(test)]
mod tests {
    use labtrack_core::sample_info::SampleInfoSchema;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::VariantArray;

    use super::*;
    use crate::db::{
        FetchMany, Pagination,
        test_util::{DbConnection, db_conn},
    };

    #[rstest]
    #[awt]
    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn every_sample_type_has_a_schema(#[future] db_conn: DbConnection) {
        let mut db_conn = db_conn;

        let sample_types = SampleType::fetch_many(&Pagination::default(), &mut db_conn)
            .await
            .unwrap();
        assert_eq!(sample_types.len(), SampleInfoSchema::VARIANTS.len());

        for SampleType { name, .. } in sample_types {
            assert!(SampleInfoSchema::resolve(&name).is_some(), "{name}");
        }
    }
}
