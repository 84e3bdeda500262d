use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Router,
};
use serde::Deserialize;

use super::context::RequestContext;
use super::domain::{MeritStatus, ScholarshipId, StudentRegNo};
use super::repository::{ApplicationStore, MeritListStore, NotificationSink, ScholarshipStore};
use super::service::MeritListService;
use crate::error::AppError;

/// Body of a manual status edit.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: MeritStatus,
}

/// Router builder exposing merit-list generation and review endpoints.
pub fn merit_router<A, S, M, N>(service: Arc<MeritListService<A, S, M, N>>) -> Router
where
    A: ApplicationStore + 'static,
    S: ScholarshipStore + 'static,
    M: MeritListStore + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/scholarships/:scholarship_id/merit-list",
            get(list_handler::<A, S, M, N>).post(generate_handler::<A, S, M, N>),
        )
        .route(
            "/api/v1/scholarships/:scholarship_id/merit-list/:student_regno",
            patch(update_status_handler::<A, S, M, N>),
        )
        .with_state(service)
}

pub(crate) async fn generate_handler<A, S, M, N>(
    State(service): State<Arc<MeritListService<A, S, M, N>>>,
    Path(scholarship_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    A: ApplicationStore + 'static,
    S: ScholarshipStore + 'static,
    M: MeritListStore + 'static,
    N: NotificationSink + 'static,
{
    let context = RequestContext::from_headers(&headers);
    let scholarship_id = ScholarshipId(scholarship_id);
    match service.generate(&context, &scholarship_id) {
        Ok(summary) => (StatusCode::CREATED, axum::Json(summary)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn list_handler<A, S, M, N>(
    State(service): State<Arc<MeritListService<A, S, M, N>>>,
    Path(scholarship_id): Path<String>,
) -> Response
where
    A: ApplicationStore + 'static,
    S: ScholarshipStore + 'static,
    M: MeritListStore + 'static,
    N: NotificationSink + 'static,
{
    match service.merit_list(&ScholarshipId(scholarship_id)) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn update_status_handler<A, S, M, N>(
    State(service): State<Arc<MeritListService<A, S, M, N>>>,
    Path((scholarship_id, student_regno)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<axum::Json<StatusUpdateRequest>, JsonRejection>,
) -> Response
where
    A: ApplicationStore + 'static,
    S: ScholarshipStore + 'static,
    M: MeritListStore + 'static,
    N: NotificationSink + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };

    let context = RequestContext::from_headers(&headers);
    match service.update_entry_status(
        &context,
        &ScholarshipId(scholarship_id),
        &StudentRegNo(student_regno),
        request.status,
    ) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}
