use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. Skills are a canonical JSONB array of
/// strings; `profile_photo` and `cv_path` hold storage keys, never URLs.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub profile_photo: Option<String>,
    pub cv_path: Option<String>,
    pub job_title: Option<String>,
    pub skills: Option<Json<Vec<String>>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// "First Last" when set, otherwise the username.
    pub fn display_name(&self) -> String {
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

    pub fn skills_list(&self) -> Vec<String> {
        self.skills.as_ref().map(|j| j.0.clone()).unwrap_or_default()
    }
}

/// Fields for a new user row; everything beyond the credentials is optional.
#[derive(Debug, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub job_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "devuser".into(),
            email: "dev@example.com".into(),
            password_hash: "x".into(),
            first_name: None,
            last_name: None,
            bio: None,
            github_url: None,
            profile_photo: None,
            cv_path: None,
            job_title: None,
            skills: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(user().display_name(), "devuser");

        let mut u = user();
        u.first_name = Some("Ada".into());
        assert_eq!(u.display_name(), "Ada");
        u.last_name = Some("Lovelace".into());
        assert_eq!(u.display_name(), "Ada Lovelace");
    }

    #[test]
    fn skills_list_defaults_to_empty() {
        assert!(user().skills_list().is_empty());
        let mut u = user();
        u.skills = Some(Json(vec!["rust".into(), "sql".into()]));
        assert_eq!(u.skills_list(), vec!["rust", "sql"]);
    }
}
