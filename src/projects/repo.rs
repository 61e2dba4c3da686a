use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, user_id, title, description, technologies, github_url, \
     screenshot, category, created_at, updated_at";

/// Project row. `screenshot` is either a local storage key or an external URL.
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Option<Json<Vec<String>>>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
    pub category: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Project {
    pub fn technologies_list(&self) -> Vec<String> {
        self.technologies
            .as_ref()
            .map(|j| j.0.clone())
            .unwrap_or_default()
    }
}

/// Project joined with its author for the public detail view.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectWithAuthor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Option<Json<Vec<String>>>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
    pub category: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProjectWithAuthor {
    pub fn author_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

pub struct NewProject {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
    pub category: Option<String>,
}

pub struct ProjectChanges {
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
    pub category: Option<String>,
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Public fetch, joined with the author.
pub async fn find_public(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ProjectWithAuthor>> {
    let row = sqlx::query_as::<_, ProjectWithAuthor>(
        "SELECT p.id, p.user_id, p.title, p.description, p.technologies, p.github_url, \
                p.screenshot, p.category, p.created_at, p.updated_at, \
                u.username, u.first_name, u.last_name \
         FROM projects p \
         JOIN users u ON u.id = p.user_id \
         WHERE p.id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Ownership check: the row only comes back when it belongs to `user_id`.
pub async fn find_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Project>> {
    let row = sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(db: &PgPool, new: &NewProject) -> anyhow::Result<Project> {
    let project = sqlx::query_as::<_, Project>(&format!(
        "INSERT INTO projects (user_id, title, description, technologies, github_url, \
         screenshot, category) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {PROJECT_COLUMNS}"
    ))
    .bind(new.user_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(Json(&new.technologies))
    .bind(&new.github_url)
    .bind(&new.screenshot)
    .bind(&new.category)
    .fetch_one(db)
    .await?;
    Ok(project)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    changes: &ProjectChanges,
) -> anyhow::Result<Project> {
    let project = sqlx::query_as::<_, Project>(&format!(
        "UPDATE projects \
         SET title = $1, description = $2, technologies = $3, github_url = $4, \
             screenshot = $5, category = $6, updated_at = now() \
         WHERE id = $7 AND user_id = $8 \
         RETURNING {PROJECT_COLUMNS}"
    ))
    .bind(&changes.title)
    .bind(&changes.description)
    .bind(Json(&changes.technologies))
    .bind(&changes.github_url)
    .bind(&changes.screenshot)
    .bind(&changes.category)
    .bind(id)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(project)
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
