mod extract;

use axum::Json;
use axum::routing::patch;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;
use self::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Deserialize)]
struct EnrollmentQueryParams {
    status: Option<PaymentStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(get_all_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/enrollments", get(get_enrollments_by_course))
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route("/enrollments/{id}", get(get_enrollment))
        .route("/enrollments/{id}/paid", patch(mark_enrollment_paid))
        .route("/admin/stats", get(dashboard_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.academy.health().await?;
    Ok(StatusCode::OK)
}

async fn get_all_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.academy.get_all_courses().await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CourseFields>
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.academy.create_course(req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CourseId>
) -> Result<Json<Course>, AppError> {
    let course = state
        .academy
        .get_course(id)
        .await?
        .ok_or(AppError::course_not_found(id))?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CourseId>,
    ApiJson(req): ApiJson<CourseFields>
) -> Result<StatusCode, AppError> {
    state.academy.update_course(id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CourseId>
) -> Result<StatusCode, AppError> {
    state.academy.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_enrollments_by_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CourseId>
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let enrollments = state.academy.get_enrollments_by_course(id).await?;
    Ok(Json(enrollments))
}

async fn list_enrollments(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<EnrollmentQueryParams>
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let enrollments = match params.status {
        Some(status) => state.academy.get_enrollments_by_status(status).await?,
        None => state.academy.get_all_enrollments().await?,
    };
    Ok(Json(enrollments))
}

async fn create_enrollment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewEnrollment>
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state.academy.create_enrollment(req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn get_enrollment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EnrollmentId>
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = state
        .academy
        .get_enrollment(id)
        .await?
        .ok_or(AppError::enrollment_not_found(id))?;
    Ok(Json(enrollment))
}

async fn mark_enrollment_paid(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<EnrollmentId>
) -> Result<StatusCode, AppError> {
    state.academy.mark_enrollment_paid(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let stats = state.academy.dashboard_stats().await?;
    Ok(Json(stats))
}
