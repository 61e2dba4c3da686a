use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::storage;

/// Profile as returned to clients: storage keys are converted to `/uploads`
/// URLs and skills are always the decoded ordered list.
#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub job_title: Option<String>,
    pub profile_photo_url: Option<String>,
    pub cv_url: Option<String>,
    pub skills: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for ProfileUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            bio: u.bio.clone(),
            github_url: u.github_url.clone(),
            job_title: u.job_title.clone(),
            profile_photo_url: u.profile_photo.as_deref().map(storage::public_url),
            cv_url: u.cv_path.as_deref().map(storage::public_url),
            skills: u.skills_list(),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
    pub is_owner: bool,
}

/// Partial update: absent fields keep their current value, blank fields clear it.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub job_title: Option<String>,
}

/// Skills arrive either as a JSON array or a comma-separated string; both
/// normalize to the same ordered list before storage.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    pub fn into_list(self) -> Vec<String> {
        let raw = match self {
            SkillsInput::List(items) => items,
            SkillsInput::Csv(s) => s.split(',').map(|p| p.to_string()).collect(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSkillsRequest {
    pub skills: SkillsInput,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub profile_photo_url: String,
}

#[derive(Debug, Serialize)]
pub struct CvResponse {
    pub cv_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_accept_list_and_preserve_order() {
        let input: UpdateSkillsRequest =
            serde_json::from_str(r#"{"skills": ["Rust", "SQL", "axum"]}"#).unwrap();
        assert_eq!(input.skills.into_list(), vec!["Rust", "SQL", "axum"]);
    }

    #[test]
    fn skills_accept_csv_string() {
        let input: UpdateSkillsRequest =
            serde_json::from_str(r#"{"skills": " Rust , SQL ,, axum "}"#).unwrap();
        assert_eq!(input.skills.into_list(), vec!["Rust", "SQL", "axum"]);
    }

    #[test]
    fn skills_drop_blank_entries() {
        let input = SkillsInput::List(vec!["  ".into(), "Go".into(), "".into()]);
        assert_eq!(input.into_list(), vec!["Go"]);
    }
}
