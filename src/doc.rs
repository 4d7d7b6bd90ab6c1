use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiDoc;

use crate::api;

/// Where the Swagger UI fetches the generated document from.
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Routes served at the root regardless of the base path.
#[derive(OpenApi)]
#[openapi(
    paths(api::health),
    tags(
        (name = "Health", description = "Liveness of the service and its database"),
        (name = "Courses", description = "Course records"),
    ),
    info(
        title = "API REST - Sistema de Cursos",
        version = "1.0.0",
        description = "CRUD and queries over academic course records",
    )
)]
pub struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(
    api::list_courses,
    api::create_course,
    api::list_active_courses,
    api::search_courses,
    api::get_course,
    api::update_course,
    api::delete_course,
    api::get_course_by_code,
    api::list_courses_by_career,
    api::list_courses_by_semester,
    api::list_courses_by_career_and_semester,
    api::career_stats,
))]
struct CourseDoc;

/// OpenAPI document with the course paths mounted under `base_path`.
pub fn openapi(base_path: &str) -> OpenApiDoc {
    let doc = ApiDoc::openapi();
    if base_path.is_empty() {
        doc.merge_from(CourseDoc::openapi())
    } else {
        doc.nest(base_path, CourseDoc::openapi())
    }
}
