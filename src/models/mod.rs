mod project;

pub use project::{now_timestamp, NewProject, Project, ProjectSummary, ProjectUpdate, CREATED_AT_FORMAT};
