pub mod components;
pub mod project_wizard;
pub mod projects;
