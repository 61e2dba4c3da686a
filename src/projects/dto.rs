use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Project, ProjectWithAuthor};
use super::services::screenshot_url;

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub screenshot_url: Option<String>,
    pub category: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Project> for ProjectResponse {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title.clone(),
            description: p.description.clone(),
            technologies: p.technologies_list(),
            github_url: p.github_url.clone(),
            screenshot_url: p.screenshot.as_deref().map(screenshot_url),
            category: p.category.clone(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Public detail view with author attribution and the caller's ownership flag.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub author_name: String,
    pub is_owner: bool,
}

impl ProjectDetail {
    pub fn new(row: &ProjectWithAuthor, viewer: Option<Uuid>) -> Self {
        let project = ProjectResponse {
            id: row.id,
            user_id: row.user_id,
            title: row.title.clone(),
            description: row.description.clone(),
            technologies: row.technologies.as_ref().map(|j| j.0.clone()).unwrap_or_default(),
            github_url: row.github_url.clone(),
            screenshot_url: row.screenshot.as_deref().map(screenshot_url),
            category: row.category.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Self {
            author_name: row.author_name(),
            is_owner: viewer == Some(row.user_id),
            project,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    #[test]
    fn detail_flattens_and_flags_owner() {
        let owner = Uuid::new_v4();
        let row = ProjectWithAuthor {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Shortener".into(),
            description: "URL shortener".into(),
            technologies: Some(Json(vec!["Rust".into()])),
            github_url: None,
            screenshot: Some("projects/project-1.png".into()),
            category: Some("web".into()),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
            username: "dev".into(),
            first_name: None,
            last_name: None,
        };

        let detail = ProjectDetail::new(&row, Some(owner));
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Shortener");
        assert_eq!(json["author_name"], "dev");
        assert_eq!(json["is_owner"], true);
        assert_eq!(json["screenshot_url"], "/uploads/projects/project-1.png");

        let anon = ProjectDetail::new(&row, None);
        assert!(!anon.is_owner);
    }
}
