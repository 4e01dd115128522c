use axum::{
    Router,
    routing::{get, post},
};

use super::AppState;
use crate::db::model::{
    experiment::{Experiment, NewExperiment},
    funding_body::{FundingBody, NewFundingBody},
    institute::{Institute, NewInstitute},
    method::{Method, NewMethod},
    project::{NewProject, Project},
    sample::Sample,
    sample_type::SampleType,
    staff::{NewStaff, Staff},
};
use handler::{by_id, list, new_sample, sample_type_schema, write};

mod error;
mod handler;
mod sample_form;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/institutes",
            post(write::<NewInstitute>).get(list::<Institute>),
        )
        .route("/institutes/{id}", get(by_id::<Institute>))
        .route("/staff", post(write::<NewStaff>).get(list::<Staff>))
        .route("/staff/{id}", get(by_id::<Staff>))
        .route("/methods", post(write::<NewMethod>).get(list::<Method>))
        .route("/methods/{id}", get(by_id::<Method>))
        .route(
            "/funding-bodies",
            post(write::<NewFundingBody>).get(list::<FundingBody>),
        )
        .route("/funding-bodies/{id}", get(by_id::<FundingBody>))
        .route("/projects", post(write::<NewProject>).get(list::<Project>))
        .route("/projects/{id}", get(by_id::<Project>))
        .route("/sample-types", get(list::<SampleType>))
        .route("/sample-types/{id}", get(by_id::<SampleType>))
        .route("/sample-types/schema/{name}", get(sample_type_schema))
        .route("/samples", post(new_sample).get(list::<Sample>))
        .route("/samples/{id}", get(by_id::<Sample>))
        .route(
            "/experiments",
            post(write::<NewExperiment>).get(list::<Experiment>),
        )
        .route("/experiments/{id}", get(by_id::<Experiment>))
}
