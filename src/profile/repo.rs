use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo::{User, USER_COLUMNS};

/// Overwrite the editable profile fields. The caller merges partial input
/// with the current row first, so this always writes the full set.
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub job_title: Option<String>,
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users \
         SET first_name = $1, last_name = $2, bio = $3, github_url = $4, job_title = $5, \
             updated_at = now() \
         WHERE id = $6 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.bio)
    .bind(&update.github_url)
    .bind(&update.job_title)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// Store the canonical skills encoding: one JSONB array of strings.
pub async fn update_skills(db: &PgPool, user_id: Uuid, skills: &[String]) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET skills = $1, updated_at = now() WHERE id = $2")
        .bind(Json(skills))
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_photo(db: &PgPool, user_id: Uuid, key: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET profile_photo = $1, updated_at = now() WHERE id = $2")
        .bind(key)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_cv(db: &PgPool, user_id: Uuid, key: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET cv_path = $1, updated_at = now() WHERE id = $2")
        .bind(key)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
