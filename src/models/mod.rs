pub mod course;

pub use course::{CareerStats, Course, CourseFields, CourseRequest, CourseStatus};
