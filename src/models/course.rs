use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::FieldError;

pub const CODE_MAX_LEN: usize = 20;
pub const NAME_MAX_LEN: usize = 150;
pub const CREDITS_RANGE: std::ops::RangeInclusive<i32> = 1..=20;
pub const SEMESTER_RANGE: std::ops::RangeInclusive<i32> = 1..=12;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    #[serde(alias = "activo")]
    Active,
    #[serde(alias = "inactivo")]
    Inactive,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    pub theoretical_hours: i32,
    pub practical_hours: i32,
    pub career_id: Option<i64>,
    pub semester: Option<i32>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /courses` and `PUT /courses/{id}`.
///
/// Everything is optional at the wire level so that missing fields are
/// reported by [`CourseRequest::validate`] instead of the JSON extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i32>,
    pub theoretical_hours: Option<i32>,
    pub practical_hours: Option<i32>,
    pub career_id: Option<i64>,
    pub semester: Option<i32>,
    pub status: Option<CourseStatus>,
}

/// Validated mutable fields of a course, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFields {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    pub theoretical_hours: i32,
    pub practical_hours: i32,
    pub career_id: Option<i64>,
    pub semester: Option<i32>,
    pub status: CourseStatus,
}

impl CourseRequest {
    pub fn validate(self) -> Result<CourseFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let code = required_text(
            &mut errors,
            "code",
            self.code,
            CODE_MAX_LEN,
            "El codigo del curso es obligatorio",
            "El codigo no puede exceder 20 caracteres",
        );
        let name = required_text(
            &mut errors,
            "name",
            self.name,
            NAME_MAX_LEN,
            "El nombre del curso es obligatorio",
            "El nombre no puede exceder 150 caracteres",
        );

        let credits = match self.credits {
            None => {
                errors.push(FieldError::new("credits", "Los creditos son obligatorios"));
                None
            }
            Some(c) if c < *CREDITS_RANGE.start() => {
                errors.push(FieldError::new(
                    "credits",
                    "El curso debe tener al menos 1 credito",
                ));
                None
            }
            Some(c) if c > *CREDITS_RANGE.end() => {
                errors.push(FieldError::new(
                    "credits",
                    "El curso no puede tener mas de 20 creditos",
                ));
                None
            }
            Some(c) => Some(c),
        };

        let theoretical_hours = self.theoretical_hours.unwrap_or(0);
        if theoretical_hours < 0 {
            errors.push(FieldError::new(
                "theoreticalHours",
                "Las horas teoricas no pueden ser negativas",
            ));
        }
        let practical_hours = self.practical_hours.unwrap_or(0);
        if practical_hours < 0 {
            errors.push(FieldError::new(
                "practicalHours",
                "Las horas practicas no pueden ser negativas",
            ));
        }

        if let Some(semester) = self.semester {
            if semester < *SEMESTER_RANGE.start() {
                errors.push(FieldError::new("semester", "El semestre debe ser al menos 1"));
            } else if semester > *SEMESTER_RANGE.end() {
                errors.push(FieldError::new(
                    "semester",
                    "El semestre no puede ser mayor a 12",
                ));
            }
        }

        match (code, name, credits) {
            (Some(code), Some(name), Some(credits)) if errors.is_empty() => Ok(CourseFields {
                code,
                name,
                description: self.description,
                credits,
                theoretical_hours,
                practical_hours,
                career_id: self.career_id,
                semester: self.semester,
                status: self.status.unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }
}

fn required_text(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<String>,
    max_len: usize,
    blank_message: &str,
    too_long_message: &str,
) -> Option<String> {
    match value {
        None => {
            errors.push(FieldError::new(field, blank_message));
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.push(FieldError::new(field, blank_message));
            None
        }
        Some(v) if v.chars().count() > max_len => {
            errors.push(FieldError::new(field, too_long_message));
            None
        }
        Some(v) => Some(v),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareerStats {
    pub career_id: i64,
    pub active_count: i64,
    pub total_credits: i64,
}
