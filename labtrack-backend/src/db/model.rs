use diesel_async::AsyncPgConnection;

use super::{Pagination, error};

pub mod experiment;
pub mod funding_body;
pub mod institute;
pub mod method;
pub mod project;
pub mod sample;
pub mod sample_type;
pub mod staff;

pub trait Write {
    type Returns;

    fn write(
        self,
        db_conn: &mut AsyncPgConnection,
    ) -> impl Future<Output = error::Result<Self::Returns>> + Send;
}

pub trait FetchById: Sized {
    type Id;

    fn fetch_by_id(
        id: &Self::Id,
        db_conn: &mut AsyncPgConnection,
    ) -> impl Future<Output = error::Result<Self>> + Send;
}

pub trait FetchMany: Sized {
    fn fetch_many(
        pagination: &Pagination,
        db_conn: &mut AsyncPgConnection,
    ) -> impl Future<Output = error::Result<Vec<Self>>> + Send;
}

/// Implements [`Write`] as a plain insert returning the stored record.
///
/// Queries run through `diesel_async::RunQueryDsl` by path, since callers
/// glob-import the blocking one from `diesel::prelude`.
macro_rules! impl_insert {
    ($new:ty => $record:ty, $table:ident) => {
        impl $crate::db::model::Write for $new {
            type Returns = $record;

            async fn write(
                self,
                db_conn: &mut diesel_async::AsyncPgConnection,
            ) -> $crate::db::error::Result<Self::Returns> {
                use diesel::prelude::*;

                let query = diesel::insert_into($crate::db::schema::$table::table)
                    .values(self)
                    .returning(<$record>::as_returning());
                let inserted = diesel_async::RunQueryDsl::get_result(query, db_conn).await?;

                Ok(inserted)
            }
        }
    };
}

/// Implements [`FetchById`] and [`FetchMany`] for a record selected from a
/// single table, listing in primary-key order.
macro_rules! impl_fetch {
    ($record:ty, $table:ident, $id_col:ident: $id:ty) => {
        impl $crate::db::model::FetchById for $record {
            type Id = $id;

            async fn fetch_by_id(
                id: &Self::Id,
                db_conn: &mut diesel_async::AsyncPgConnection,
            ) -> $crate::db::error::Result<Self> {
                use diesel::prelude::*;

                let query = $crate::db::schema::$table::table
                    .find(id)
                    .select(Self::as_select());

                Ok(diesel_async::RunQueryDsl::first(query, db_conn).await?)
            }
        }

        impl $crate::db::model::FetchMany for $record {
            async fn fetch_many(
                pagination: &$crate::db::Pagination,
                db_conn: &mut diesel_async::AsyncPgConnection,
            ) -> $crate::db::error::Result<Vec<Self>> {
                use diesel::prelude::*;
                use $crate::db::schema::$table::dsl::{$id_col, $table};

                let $crate::db::Pagination { limit, offset } = *pagination;

                let query = $table
                    .select(Self::as_select())
                    .order_by($id_col.asc())
                    .limit(limit)
                    .offset(offset);

                Ok(diesel_async::RunQueryDsl::load(query, db_conn).await?)
            }
        }
    };
}

pub(crate) use {impl_fetch, impl_insert};
