use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{DocumentRow, MemberRow, ProjectRow};
use crate::projects::services::screenshot_url;
use crate::{storage, uploads};

#[derive(Debug, Serialize)]
pub struct MemberCard {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub job_title: Option<String>,
    pub profile_photo_url: Option<String>,
}

impl From<&MemberRow> for MemberCard {
    fn from(m: &MemberRow) -> Self {
        Self {
            id: m.id,
            username: m.username.clone(),
            full_name: m.full_name(),
            job_title: m.job_title.clone(),
            profile_photo_url: m.profile_photo.as_deref().map(storage::public_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub screenshot_url: Option<String>,
    pub category: Option<String>,
    pub author_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&ProjectRow> for ProjectCard {
    fn from(p: &ProjectRow) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            description: p.description.clone(),
            technologies: p.technologies.as_ref().map(|j| j.0.clone()).unwrap_or_default(),
            github_url: p.github_url.clone(),
            screenshot_url: p.screenshot.as_deref().map(screenshot_url),
            category: p.category.clone(),
            author_name: p.author_name(),
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentCard {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: Option<String>,
    pub file_size_formatted: String,
    pub file_extension: Option<String>,
    pub author_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&DocumentRow> for DocumentCard {
    fn from(d: &DocumentRow) -> Self {
        Self {
            id: d.id,
            title: d.title.clone(),
            description: d.description.clone(),
            file_url: storage::public_url(&d.file_path),
            file_type: d.file_type.clone(),
            file_size_formatted: uploads::format_file_size(d.file_size),
            file_extension: uploads::file_extension(&d.file_path),
            author_name: d.author_name(),
            created_at: d.created_at,
        }
    }
}

/// The public landing-page aggregation.
#[derive(Debug, Serialize)]
pub struct ShowcaseResponse {
    pub members: Vec<MemberCard>,
    pub projects: Vec<ProjectCard>,
    pub documents: Vec<DocumentCard>,
    pub total_members: i64,
    pub is_logged_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_card_derives_photo_url_and_name() {
        let row = MemberRow {
            id: Uuid::new_v4(),
            username: "alove".into(),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            profile_photo: Some("profiles/profile-1.jpg".into()),
            job_title: Some("Engineer".into()),
        };
        let card = MemberCard::from(&row);
        assert_eq!(card.full_name, "Ada Lovelace");
        assert_eq!(
            card.profile_photo_url.as_deref(),
            Some("/uploads/profiles/profile-1.jpg")
        );
    }

    #[test]
    fn document_card_formats_size() {
        let row = DocumentRow {
            id: Uuid::new_v4(),
            title: "Thesis".into(),
            description: None,
            file_path: "documents/doc-1.pdf".into(),
            file_type: Some("pdf".into()),
            file_size: 1536,
            created_at: OffsetDateTime::now_utc(),
            username: "alove".into(),
            first_name: None,
            last_name: None,
        };
        let card = DocumentCard::from(&row);
        assert_eq!(card.file_size_formatted, "1.50 KB");
        assert_eq!(card.author_name, "alove");
        assert_eq!(card.file_extension.as_deref(), Some("pdf"));
    }
}
