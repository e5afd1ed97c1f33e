use chrono::{Local, NaiveDateTime};

/// Storage format of `created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub link: String,
    pub created_at: String,
}

impl Project {
    pub fn created_at_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT).ok()
    }
}

/// Row shape returned by the project list.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub link: String,
}

impl NewProject {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            link: link.into(),
        }
    }

    /// An imported project keeps the file path in `link`. The file itself is never read.
    pub fn import(
        name: impl Into<String>,
        description: impl Into<String>,
        path: impl AsRef<std::path::Path>,
    ) -> Self {
        Self::new(name, description, path.as_ref().display().to_string())
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub description: String,
    pub link: String,
}

impl ProjectUpdate {
    pub fn new(description: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            link: link.into(),
        }
    }
}

pub fn now_timestamp() -> String {
    Local::now().format(CREATED_AT_FORMAT).to_string()
}
