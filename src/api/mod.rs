use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{IntoParams, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::doc;
use crate::error::{AppError, ErrorResponse};
use crate::models::*;
use crate::state::AppState;

const DELETED_MESSAGE: &str = "Curso eliminado exitosamente";

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive fragment of the course name
    name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i64,
}

/// Full application: course routes under `base_path`, `/health` and the
/// Swagger UI at the root.
pub fn router(state: AppState, base_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger = SwaggerUi::new("/swagger-ui").url(doc::OPENAPI_JSON, doc::openapi(base_path));

    let app = Router::new().route("/health", get(health)).merge(swagger);
    let app = if base_path.is_empty() {
        app.merge(course_routes())
    } else {
        app.nest(base_path, course_routes())
    };

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/active", get(list_active_courses))
        .route("/courses/search", get(search_courses))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/code/{code}", get(get_course_by_code))
        .route("/courses/career/{career_id}", get(list_courses_by_career))
        .route("/courses/semester/{semester}", get(list_courses_by_semester))
        .route(
            "/courses/career/{career_id}/semester/{semester}",
            get(list_courses_by_career_and_semester),
        )
        .route("/courses/stats/career/{career_id}", get(career_stats))
}

/// Reports whether the service can reach its database
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are reachable"),
        (status = 500, description = "Database unreachable", body = ErrorResponse)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

/// List every course
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "All courses ordered by id", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.courses.get_all().await?;
    Ok(Json(courses))
}

/// Get a course by id
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(
        ("id" = i64, Path, description = "Course id")
    ),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses.get_by_id(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

/// Get a course by its unique code
#[utoipa::path(
    get,
    path = "/courses/code/{code}",
    params(
        ("code" = String, Path, description = "Course code, e.g. MAT101")
    ),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn get_course_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = state
        .courses
        .get_by_code(&code)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Invalid fields or duplicate code", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    payload: Result<Json<CourseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let Json(req) = payload?;
    let course = state.courses.create(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Replace every mutable field of a course
#[utoipa::path(
    put,
    path = "/courses/{id}",
    params(
        ("id" = i64, Path, description = "Course id")
    ),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Invalid fields or duplicate code", body = ErrorResponse),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<CourseRequest>, JsonRejection>,
) -> Result<Json<Course>, AppError> {
    let Json(req) = payload?;
    let course = state.courses.update(id, req).await?;
    Ok(Json(course))
}

/// Delete a course
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(
        ("id" = i64, Path, description = "Course id")
    ),
    responses(
        (status = 200, description = "Course deleted", body = DeleteResponse),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = state.courses.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: DELETED_MESSAGE.to_string(),
        id,
    }))
}

/// List the courses of a career
#[utoipa::path(
    get,
    path = "/courses/career/{career_id}",
    params(
        ("career_id" = i64, Path, description = "Career id")
    ),
    responses(
        (status = 200, description = "Courses of the career", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn list_courses_by_career(
    State(state): State<AppState>,
    Path(career_id): Path<i64>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(state.courses.get_by_career(career_id).await?))
}

/// List the courses of a semester
#[utoipa::path(
    get,
    path = "/courses/semester/{semester}",
    params(
        ("semester" = i32, Path, description = "Semester, 1 to 12")
    ),
    responses(
        (status = 200, description = "Courses of the semester", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn list_courses_by_semester(
    State(state): State<AppState>,
    Path(semester): Path<i32>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(state.courses.get_by_semester(semester).await?))
}

/// List the active courses
#[utoipa::path(
    get,
    path = "/courses/active",
    responses(
        (status = 200, description = "Courses with status active", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn list_active_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(state.courses.get_active().await?))
}

/// Search courses by name
#[utoipa::path(
    get,
    path = "/courses/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Courses whose name contains it", body = Vec<Course>),
        (status = 400, description = "Missing name parameter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn search_courses(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Course>>, AppError> {
    let Query(params) = params?;
    Ok(Json(state.courses.search_by_name(&params.name).await?))
}

/// List the courses of a career in one semester
#[utoipa::path(
    get,
    path = "/courses/career/{career_id}/semester/{semester}",
    params(
        ("career_id" = i64, Path, description = "Career id"),
        ("semester" = i32, Path, description = "Semester, 1 to 12")
    ),
    responses(
        (status = 200, description = "Matching courses", body = Vec<Course>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn list_courses_by_career_and_semester(
    State(state): State<AppState>,
    Path((career_id, semester)): Path<(i64, i32)>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state
        .courses
        .get_by_career_and_semester(career_id, semester)
        .await?;
    Ok(Json(courses))
}

/// Active course count and credit total of a career
#[utoipa::path(
    get,
    path = "/courses/stats/career/{career_id}",
    params(
        ("career_id" = i64, Path, description = "Career id")
    ),
    responses(
        (status = 200, description = "Career statistics", body = CareerStats),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn career_stats(
    State(state): State<AppState>,
    Path(career_id): Path<i64>,
) -> Result<Json<CareerStats>, AppError> {
    Ok(Json(state.courses.statistics(career_id).await?))
}
