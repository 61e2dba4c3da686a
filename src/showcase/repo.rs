use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

// Limits match the landing page layout: a 4x3 member grid and 3x3 card grids.
pub const MEMBER_LIMIT: i64 = 12;
pub const PROJECT_LIMIT: i64 = 9;
pub const DOCUMENT_LIMIT: i64 = 9;

fn display_name(first: Option<&str>, last: Option<&str>, username: &str) -> String {
    let full = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        full.to_string()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub job_title: Option<String>,
}

impl MemberRow {
    pub fn full_name(&self) -> String {
        display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            &self.username,
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Option<Json<Vec<String>>>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
    pub category: Option<String>,
    pub created_at: OffsetDateTime,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProjectRow {
    pub fn author_name(&self) -> String {
        display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            &self.username,
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: i64,
    pub created_at: OffsetDateTime,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl DocumentRow {
    pub fn author_name(&self) -> String {
        display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            &self.username,
        )
    }
}

pub async fn recent_members(db: &PgPool) -> anyhow::Result<Vec<MemberRow>> {
    let rows = sqlx::query_as::<_, MemberRow>(
        "SELECT id, username, first_name, last_name, profile_photo, job_title \
         FROM users ORDER BY created_at DESC LIMIT $1",
    )
    .bind(MEMBER_LIMIT)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn recent_projects(db: &PgPool) -> anyhow::Result<Vec<ProjectRow>> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT p.id, p.title, p.description, p.technologies, p.github_url, p.screenshot, \
                p.category, p.created_at, u.username, u.first_name, u.last_name \
         FROM projects p \
         JOIN users u ON u.id = p.user_id \
         ORDER BY p.created_at DESC LIMIT $1",
    )
    .bind(PROJECT_LIMIT)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn recent_documents(db: &PgPool) -> anyhow::Result<Vec<DocumentRow>> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT d.id, d.title, d.description, d.file_path, d.file_type, d.file_size, \
                d.created_at, u.username, u.first_name, u.last_name \
         FROM documents d \
         JOIN users u ON u.id = d.user_id \
         ORDER BY d.created_at DESC LIMIT $1",
    )
    .bind(DOCUMENT_LIMIT)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn member_count(db: &PgPool) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_real_name() {
        assert_eq!(display_name(Some("Ada"), Some("Lovelace"), "alove"), "Ada Lovelace");
        assert_eq!(display_name(Some("Ada"), None, "alove"), "Ada");
        assert_eq!(display_name(None, None, "alove"), "alove");
        assert_eq!(display_name(Some("  "), None, "alove"), "alove");
    }
}
