use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        repo::User,
        services::{is_valid_url, AuthUser, MaybeAuthUser},
    },
    error::ApiError,
    response::Envelope,
    state::AppState,
    storage,
    uploads::{self, MultipartForm},
};

use super::dto::{
    CvResponse, PhotoResponse, ProfileResponse, ProfileUser, SkillsResponse, UpdateProfileRequest,
    UpdateSkillsRequest,
};
use super::repo::{self, ProfileUpdate};

#[instrument(skip(state))]
pub async fn get_own_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<ProfileResponse>>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;
    Ok(Envelope::ok(
        "Profile retrieved successfully",
        ProfileResponse {
            user: ProfileUser::from(&user),
            is_owner: true,
        },
    ))
}

/// Public profile view; `is_owner` reflects whether the (optional) caller is
/// looking at their own profile.
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ProfileResponse>>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;
    Ok(Envelope::ok(
        "Profile retrieved successfully",
        ProfileResponse {
            user: ProfileUser::from(&user),
            is_owner: viewer == Some(id),
        },
    ))
}

/// Absent field keeps the stored value, blank string clears it.
fn merge(new: Option<String>, current: Option<String>) -> Option<String> {
    match new {
        Some(v) => {
            let v = v.trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        }
        None => current,
    }
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<ProfileResponse>>, ApiError> {
    let current = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let update = ProfileUpdate {
        first_name: merge(payload.first_name, current.first_name.clone()),
        last_name: merge(payload.last_name, current.last_name.clone()),
        bio: merge(payload.bio, current.bio.clone()),
        github_url: merge(payload.github_url, current.github_url.clone()),
        job_title: merge(payload.job_title, current.job_title.clone()),
    };

    if let Some(url) = update.github_url.as_deref() {
        if !is_valid_url(url) {
            return Err(ApiError::Validation(vec![
                "Invalid GitHub URL format.".to_string()
            ]));
        }
    }

    let user = repo::update_profile(&state.db, user_id, &update).await?;
    Ok(Envelope::ok(
        "Profile updated successfully!",
        ProfileResponse {
            user: ProfileUser::from(&user),
            is_owner: true,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_skills(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateSkillsRequest>,
) -> Result<Json<Envelope<SkillsResponse>>, ApiError> {
    let skills = payload.skills.into_list();
    repo::update_skills(&state.db, user_id, &skills).await?;
    Ok(Envelope::ok(
        "Skills updated successfully!",
        SkillsResponse { skills },
    ))
}

#[instrument(skip(state, multipart))]
pub async fn update_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<Envelope<PhotoResponse>>, ApiError> {
    let form = MultipartForm::read(multipart).await?;
    let file = form
        .file("profile_photo")
        .ok_or_else(|| ApiError::Validation(vec!["No file was uploaded.".to_string()]))?;

    uploads::validate_upload(
        file,
        uploads::ALLOWED_IMAGE_TYPES,
        state.config.uploads.max_image_size,
    )
    .map_err(|e| ApiError::Validation(vec![e]))?;

    let current = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let key = uploads::storage_key("profiles", "profile", file.filename.as_deref());
    state.storage.put_object(&key, file.bytes.clone()).await?;

    if let Err(e) = repo::update_photo(&state.db, user_id, &key).await {
        // The row was not updated; drop the file we just stored.
        if let Err(cleanup) = state.storage.delete_object(&key).await {
            warn!(error = %cleanup, %key, "failed to clean up orphaned photo");
        }
        return Err(e.into());
    }

    if let Some(old) = current.profile_photo.as_deref() {
        if let Err(e) = state.storage.delete_object(old).await {
            warn!(error = %e, key = %old, "failed to delete previous photo");
        }
    }

    Ok(Envelope::ok(
        "Profile photo updated successfully!",
        PhotoResponse {
            profile_photo_url: storage::public_url(&key),
        },
    ))
}

#[instrument(skip(state, multipart))]
pub async fn upload_cv(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<Envelope<CvResponse>>, ApiError> {
    let form = MultipartForm::read(multipart).await?;
    let file = form
        .file("cv_file")
        .ok_or_else(|| ApiError::Validation(vec!["No file was uploaded.".to_string()]))?;

    uploads::validate_upload(
        file,
        uploads::ALLOWED_CV_TYPES,
        state.config.uploads.max_file_size,
    )
    .map_err(|e| ApiError::Validation(vec![e]))?;

    let current = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let key = uploads::storage_key("cv", "cv", file.filename.as_deref());
    state.storage.put_object(&key, file.bytes.clone()).await?;

    if let Err(e) = repo::update_cv(&state.db, user_id, &key).await {
        if let Err(cleanup) = state.storage.delete_object(&key).await {
            warn!(error = %cleanup, %key, "failed to clean up orphaned cv");
        }
        return Err(e.into());
    }

    if let Some(old) = current.cv_path.as_deref() {
        if let Err(e) = state.storage.delete_object(old).await {
            warn!(error = %e, key = %old, "failed to delete previous cv");
        }
    }

    Ok(Envelope::ok(
        "CV uploaded successfully!",
        CvResponse {
            cv_url: storage::public_url(&key),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_clears_and_replaces() {
        assert_eq!(merge(None, Some("old".into())), Some("old".into()));
        assert_eq!(merge(Some("  ".into()), Some("old".into())), None);
        assert_eq!(merge(Some(" new ".into()), Some("old".into())), Some("new".into()));
        assert_eq!(merge(None, None), None);
    }
}
