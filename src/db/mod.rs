use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::Config;
use crate::models::{now_timestamp, NewProject, Project, ProjectSummary, ProjectUpdate};

pub use crate::error::{Error, Result};

const CREATE_PROJECTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        link TEXT,
        created_at TEXT NOT NULL
    )
"#;

/// Handle to the portfolio database.
///
/// The pool is capped at one connection that never idles out, so the
/// handle behaves as a single long-lived connection.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file at `path` and ensure the schema exists
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let db = Self::connect_with(options).await?;
        tracing::info!(path = %path.display(), "opened portfolio database");
        Ok(db)
    }

    /// Private database that disappears when the handle is closed
    pub async fn open_in_memory() -> Result<Self> {
        let options = "sqlite::memory:".parse::<SqliteConnectOptions>()?;
        Self::connect_with(options).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_PROJECTS_TABLE)
            .execute(self.get_pool())
            .await?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let projects = sqlx::query_as::<_, ProjectSummary>(
            "SELECT id, name FROM projects ORDER BY id ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(projects)
    }

    pub async fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name,
                   COALESCE(description, '') AS description,
                   COALESCE(link, '') AS link,
                   created_at
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(project)
    }

    /// Like `get_project`, but absence is an error
    pub async fn require_project(&self, id: i64) -> Result<Project> {
        match self.get_project(id).await? {
            Some(project) => Ok(project),
            None => {
                tracing::warn!(id, "project not found");
                Err(Error::NotFound(id))
            }
        }
    }

    /// Insert a project stamped with the current local time. Returns the new id.
    pub async fn create_project(&self, project: &NewProject) -> Result<i64> {
        if !project.has_name() {
            tracing::warn!("rejected project with empty name");
            return Err(Error::EmptyName);
        }

        let created_at = now_timestamp();
        let id = sqlx::query(
            "INSERT INTO projects (name, description, link, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.link)
        .bind(&created_at)
        .execute(self.get_pool())
        .await?
        .last_insert_rowid();

        tracing::info!(id, name = %project.name, "created project");
        Ok(id)
    }

    /// Overwrite description and link. Returns the number of rows touched (0 or 1).
    pub async fn update_project(&self, id: i64, update: &ProjectUpdate) -> Result<u64> {
        let affected = sqlx::query("UPDATE projects SET description = ?, link = ? WHERE id = ?")
            .bind(&update.description)
            .bind(&update.link)
            .bind(id)
            .execute(self.get_pool())
            .await?
            .rows_affected();

        tracing::info!(id, affected, "updated project");
        Ok(affected)
    }

    pub async fn delete_project(&self, id: i64) -> Result<u64> {
        let affected = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.get_pool())
            .await?
            .rows_affected();

        tracing::info!(id, affected, "deleted project");
        Ok(affected)
    }

    /// Release the connection
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("closed portfolio database");
    }
}

/// Open the database named by the configuration
pub async fn init(config: &Config) -> Result<Database> {
    Database::open(config.database_path()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CREATED_AT_FORMAT;
    use chrono::{Local, NaiveDateTime};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_db_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "portfolio-{}-{}-{}.db",
            tag,
            std::process::id(),
            nanos
        ))
    }

    async fn count(db: &Database) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects")
            .fetch_one(db.get_pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_returns_full_row() {
        let db = Database::open_in_memory().await.unwrap();
        let before = NaiveDateTime::parse_from_str(
            &Local::now().format(CREATED_AT_FORMAT).to_string(),
            CREATED_AT_FORMAT,
        )
        .unwrap();

        let id = db
            .create_project(&NewProject::new("Site", "my site", "http://x"))
            .await
            .unwrap();

        let project = db.get_project(id).await.unwrap().unwrap();
        assert_eq!(project.id, id);
        assert_eq!(project.name, "Site");
        assert_eq!(project.description, "my site");
        assert_eq!(project.link, "http://x");
        assert!(project.created_at_time().unwrap() >= before);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_writing() {
        let db = Database::open_in_memory().await.unwrap();

        let err = db
            .create_project(&NewProject::new("", "desc", "link"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyName));

        let err = db
            .create_project(&NewProject::new("  \t", "", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyName));
        assert!(err.is_user_facing());

        assert_eq!(count(&db).await, 0);
    }

    #[tokio::test]
    async fn ids_are_unique_and_never_reused() {
        let db = Database::open_in_memory().await.unwrap();
        let first = db.create_project(&NewProject::new("A", "", "")).await.unwrap();
        let second = db.create_project(&NewProject::new("B", "", "")).await.unwrap();
        assert!(second > first);

        db.delete_project(second).await.unwrap();
        let third = db.create_project(&NewProject::new("C", "", "")).await.unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn update_touches_only_description_and_link() {
        let db = Database::open_in_memory().await.unwrap();
        let id = db
            .create_project(&NewProject::new("Site", "my site", "http://x"))
            .await
            .unwrap();
        let original = db.get_project(id).await.unwrap().unwrap();

        let affected = db
            .update_project(id, &ProjectUpdate::new("v2", "http://y"))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let updated = db.get_project(id).await.unwrap().unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.name, "Site");
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.description, "v2");
        assert_eq!(updated.link, "http://y");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_change_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        let id = db
            .create_project(&NewProject::new("Keep", "d", "l"))
            .await
            .unwrap();
        let before = db.get_project(id).await.unwrap();

        let affected = db
            .update_project(id + 100, &ProjectUpdate::new("x", "y"))
            .await
            .unwrap();
        assert_eq!(affected, 0);
        assert_eq!(db.delete_project(id + 100).await.unwrap(), 0);

        assert_eq!(db.get_project(id).await.unwrap(), before);
        assert_eq!(count(&db).await, 1);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row() {
        let db = Database::open_in_memory().await.unwrap();
        let keep = db.create_project(&NewProject::new("Keep", "", "")).await.unwrap();
        let gone = db.create_project(&NewProject::new("Gone", "", "")).await.unwrap();

        assert_eq!(db.delete_project(gone).await.unwrap(), 1);

        assert!(db.get_project(gone).await.unwrap().is_none());
        assert!(db.get_project(keep).await.unwrap().is_some());
        assert!(matches!(
            db.require_project(gone).await,
            Err(Error::NotFound(id)) if id == gone
        ));
    }

    #[tokio::test]
    async fn list_reflects_inserts_and_deletes() {
        let db = Database::open_in_memory().await.unwrap();
        let mut ids = Vec::new();
        for name in ["one", "two", "three", "four", "five"] {
            ids.push(db.create_project(&NewProject::new(name, "", "")).await.unwrap());
        }
        db.delete_project(ids[1]).await.unwrap();
        db.delete_project(ids[3]).await.unwrap();

        let listed = db.list_projects().await.unwrap();
        let expected = vec![
            ProjectSummary { id: ids[0], name: "one".into() },
            ProjectSummary { id: ids[2], name: "three".into() },
            ProjectSummary { id: ids[4], name: "five".into() },
        ];
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn lifecycle_example() {
        let db = Database::open_in_memory().await.unwrap();
        let id = db
            .create_project(&NewProject::new("Site", "my site", "http://x"))
            .await
            .unwrap();
        assert_eq!(id, 1);
        let t0 = db.get_project(1).await.unwrap().unwrap().created_at;

        db.update_project(1, &ProjectUpdate::new("v2", "http://y"))
            .await
            .unwrap();
        let project = db.get_project(1).await.unwrap().unwrap();
        assert_eq!(
            (project.name.as_str(), project.description.as_str(), project.link.as_str()),
            ("Site", "v2", "http://y")
        );
        assert_eq!(project.created_at, t0);

        db.delete_project(1).await.unwrap();
        assert!(db.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn imported_project_keeps_path_as_link() {
        let db = Database::open_in_memory().await.unwrap();
        let id = db
            .create_project(&NewProject::import("Solver", "", "/does/not/exist.cpp"))
            .await
            .unwrap();
        let project = db.get_project(id).await.unwrap().unwrap();
        assert_eq!(project.link, "/does/not/exist.cpp");
    }

    #[tokio::test]
    async fn null_columns_read_back_as_empty() {
        let db = Database::open_in_memory().await.unwrap();
        sqlx::query("INSERT INTO projects (name, created_at) VALUES ('Legacy', '2024-01-01 00:00:00')")
            .execute(db.get_pool())
            .await
            .unwrap();

        let listed = db.list_projects().await.unwrap();
        let project = db.get_project(listed[0].id).await.unwrap().unwrap();
        assert_eq!(project.description, "");
        assert_eq!(project.link, "");
    }

    #[tokio::test]
    async fn open_is_idempotent_and_persists() {
        let path = temp_db_path("reopen");

        let db = Database::open(&path).await.unwrap();
        let id = db
            .create_project(&NewProject::new("Persisted", "", ""))
            .await
            .unwrap();
        db.close().await;

        let db = Database::open(&path).await.unwrap();
        let project = db.get_project(id).await.unwrap().unwrap();
        assert_eq!(project.name, "Persisted");
        db.close().await;

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn open_fails_for_missing_directory() {
        let path = temp_db_path("missing").join("nested").join("portfolio.db");
        let result = Database::open(&path).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn init_uses_configured_path() {
        let path = temp_db_path("config");
        let config = Config::default().with_overrides(Some(path.clone()), None);

        let db = init(&config).await.unwrap();
        assert!(db.list_projects().await.unwrap().is_empty());
        db.close().await;
        assert!(path.exists());

        std::fs::remove_file(&path).ok();
    }
}
