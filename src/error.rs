use thiserror::Error;

/// Errors raised by the project repository
#[derive(Debug, Error)]
pub enum Error {
    #[error("Project name cannot be empty!")]
    EmptyName,

    #[error("Project {0} no longer exists!")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// Validation and absence errors are shown to the user and leave the app running.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::EmptyName | Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
