//! # Student Routes
//!
//! One handler per endpoint. Identifiers are decoded before the store is touched,
//! and every failure is reported through [`ApiError`].

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};
use bson::Document;
use futures::TryStreamExt;
use serde::Serialize;
use tracing::debug;

use roster_core::{id::RecordId, payload::Payload};

use crate::{
    error::{ApiError, ApiResult},
    filter::StudentFilter,
    server::AppState,
    student::detail_projection,
    validator::validate_new_student,
};

/// Response body for the listing endpoint
#[derive(Debug, Serialize)]
pub struct StudentList {
    pub data: Vec<Document>,
}

/// Response body for a created student
#[derive(Debug, Serialize)]
pub struct CreatedStudent {
    pub id: String,
}

fn body(payload: Result<Json<Payload>, JsonRejection>) -> ApiResult<Payload> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

/// GET /students
pub async fn list_students(
    State(state): State<AppState>,
    params: Result<Query<StudentFilter>, QueryRejection>,
) -> ApiResult<Json<StudentList>> {
    let Query(filter) = params.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;

    let data = state
        .students
        .find(filter.into_query())
        .await?
        .try_collect::<Vec<_>>()
        .await?;

    debug!(count = data.len(), "listed students");

    Ok(Json(StudentList { data }))
}

/// POST /students
pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<Payload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedStudent>)> {
    let payload = body(payload)?;
    validate_new_student(&payload)?;

    let id = state
        .students
        .insert(payload.into_document())
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedStudent { id: id.to_hex() })))
}

/// GET /students/:id
pub async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Document>> {
    let id = RecordId::parse(&student_id)?;

    state
        .students
        .find_one(&id, &detail_projection())
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// PATCH /students/:id
///
/// Succeeds whether or not a student matched.
pub async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    payload: Result<Json<Payload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = RecordId::parse(&student_id)?;
    let payload = body(payload)?;

    let matched = state
        .students
        .update(&id, payload.into_document())
        .await?;

    debug!(%id, matched, "patched student");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /students/:id
///
/// Succeeds whether or not a student matched.
pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = RecordId::parse(&student_id)?;

    state.students.delete(&id).await?;

    Ok(StatusCode::OK)
}
