use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use diesel_async::{AsyncConnection, scoped_futures::ScopedFutureExt};
use garde::Validate;
use labtrack_core::sample_info::{SampleInfoSchema, SchemaDescription};
use serde::{Serialize, de::DeserializeOwned};
use valuable::Valuable;

use super::{
    error::{Error, Result},
    sample_form::SampleForm,
};
use crate::{
    db::{FetchById, FetchMany, Pagination, Write, model::sample::Sample},
    server::AppState,
};

pub(super) struct ValidJson<T>(T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
    T: Validate,
    <T as Validate>::Context: std::default::Default,
{
    type Rejection = Error;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;

        Ok(Self(data))
    }
}

impl<T: Serialize> IntoResponse for ValidJson<T> {
    fn into_response(self) -> Response {
        let Self(inner) = self;

        Json(inner).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub(super) struct Path<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(Error))]
pub(super) struct Query<T>(T);

pub(super) async fn write<Data>(
    State(app_state): State<AppState>,
    ValidJson(data): ValidJson<Data>,
) -> Result<(StatusCode, Json<Data::Returns>)>
where
    Data: Write + Send + Valuable,
    Data::Returns: Serialize + Send,
{
    tracing::info!(deserialized_data = data.as_value());

    let mut db_conn = app_state.db_conn().await?;

    let item = db_conn
        .transaction(|conn| async move { data.write(conn).await }.scope_boxed())
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub(super) async fn by_id<Resource>(
    State(app_state): State<AppState>,
    Path(resource_id): Path<Resource::Id>,
) -> Result<Json<Resource>>
where
    Resource: FetchById + Serialize + Send,
    Resource::Id: DeserializeOwned + Send + Sync + Valuable,
{
    tracing::info!(deserialized_id = resource_id.as_value());

    let mut db_conn = app_state.db_conn().await?;
    let item = Resource::fetch_by_id(&resource_id, &mut db_conn).await?;

    Ok(Json(item))
}

pub(super) async fn list<Resource>(
    State(app_state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Resource>>>
where
    Resource: FetchMany + Serialize + Send,
{
    pagination.validate()?;
    tracing::info!(deserialized_pagination = pagination.as_value());

    let mut db_conn = app_state.db_conn().await?;
    let items = Resource::fetch_many(&pagination, &mut db_conn).await?;

    Ok(Json(items))
}

/// Accepts a `multipart/form-data` sample submission. The sample ID's date is
/// checked against today's date in UTC.
pub(super) async fn new_sample(
    State(app_state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Sample>)> {
    let form = SampleForm::from_multipart(multipart?).await?;
    let submission = form.into_submission(Utc::now().date_naive())?;
    submission.validate()?;

    tracing::info!(deserialized_data = submission.as_value());

    let mut db_conn = app_state.db_conn().await?;

    let sample = db_conn
        .transaction(|conn| async move { submission.write(conn).await }.scope_boxed())
        .await?;

    Ok((StatusCode::CREATED, Json(sample)))
}

pub(super) async fn sample_type_schema(
    Path(name): Path<String>,
) -> Result<Json<SchemaDescription>> {
    let Some(schema) = SampleInfoSchema::resolve(&name) else {
        return Err(Error::SampleTypeNotFound { name });
    };

    Ok(Json(schema.describe()))
}
