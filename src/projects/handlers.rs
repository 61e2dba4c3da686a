use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::{is_valid_url, AuthUser, MaybeAuthUser},
    error::ApiError,
    response::Envelope,
    state::AppState,
    uploads::{self, MultipartForm, UploadedFile},
};

use super::dto::{ProjectDetail, ProjectResponse};
use super::repo::{self, NewProject, ProjectChanges};
use super::services::{is_external, parse_technologies};

#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<Vec<ProjectResponse>>>, ApiError> {
    let projects = repo::list_by_user(&state.db, user_id).await?;
    Ok(Envelope::ok(
        "Projects retrieved successfully",
        projects.iter().map(ProjectResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ProjectDetail>>, ApiError> {
    let row = repo::find_public(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(Envelope::ok(
        "Project retrieved successfully",
        ProjectDetail::new(&row, viewer),
    ))
}

struct ProjectInput {
    title: String,
    description: String,
    technologies: Vec<String>,
    github_url: Option<String>,
    screenshot_url: Option<String>,
    category: Option<String>,
}

/// Validate the shared create/update fields, accumulating every failure.
fn validate_fields(form: &MultipartForm) -> Result<ProjectInput, Vec<String>> {
    let mut errors = Vec::new();

    let title = form.text("title").unwrap_or_default().to_string();
    if title.is_empty() {
        errors.push("Project title is required.".to_string());
    }

    let description = form.text("description").unwrap_or_default().to_string();
    if description.is_empty() {
        errors.push("Project description is required.".to_string());
    }

    let github_url = form.text("github_url").map(|s| s.to_string());
    if let Some(url) = github_url.as_deref() {
        if !is_valid_url(url) {
            errors.push("Invalid GitHub URL format.".to_string());
        }
    }

    let screenshot_url = form.text("screenshot_url").map(|s| s.to_string());
    if let Some(url) = screenshot_url.as_deref() {
        if !is_valid_url(url) {
            errors.push("Invalid Screenshot URL format.".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ProjectInput {
        title,
        description,
        technologies: form
            .text("technologies")
            .map(parse_technologies)
            .unwrap_or_default(),
        github_url,
        screenshot_url,
        category: form.text("category").map(|s| s.to_string()),
    })
}

/// Store an uploaded screenshot and return its key. Validation runs before
/// any write, so a rejected file never touches disk or the database.
async fn store_screenshot(
    state: &AppState,
    file: &UploadedFile,
) -> Result<String, ApiError> {
    uploads::validate_upload(
        file,
        uploads::ALLOWED_IMAGE_TYPES,
        state.config.uploads.max_file_size,
    )
    .map_err(|e| ApiError::Validation(vec![e]))?;
    let key = uploads::storage_key("projects", "project", file.filename.as_deref());
    state.storage.put_object(&key, file.bytes.clone()).await?;
    Ok(key)
}

async fn delete_local_screenshot(state: &AppState, screenshot: &str) {
    if is_external(screenshot) {
        return;
    }
    if let Err(e) = state.storage.delete_object(screenshot).await {
        warn!(error = %e, key = %screenshot, "failed to delete screenshot file");
    }
}

#[instrument(skip(state, multipart))]
pub async fn create_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<ProjectResponse>>), ApiError> {
    let form = MultipartForm::read(multipart).await?;
    let input = validate_fields(&form).map_err(ApiError::Validation)?;

    // File upload wins over an external screenshot URL, as in the form UI.
    let screenshot = match form.file("screenshot") {
        Some(file) => Some(store_screenshot(&state, file).await?),
        None => input.screenshot_url.clone(),
    };

    let new = NewProject {
        user_id,
        title: input.title,
        description: input.description,
        technologies: input.technologies,
        github_url: input.github_url,
        screenshot,
        category: input.category,
    };

    let project = match repo::insert(&state.db, &new).await {
        Ok(p) => p,
        Err(e) => {
            // Insert failed after the file move; remove the orphan.
            if let Some(key) = new.screenshot.as_deref().filter(|s| !is_external(s)) {
                if let Err(cleanup) = state.storage.delete_object(key).await {
                    warn!(error = %cleanup, %key, "failed to clean up orphaned screenshot");
                }
            }
            return Err(e.into());
        }
    };

    info!(project_id = %project.id, %user_id, "project created");
    Ok((
        StatusCode::CREATED,
        Envelope::ok("Project created successfully", ProjectResponse::from(&project)),
    ))
}

#[instrument(skip(state, multipart))]
pub async fn update_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Envelope<ProjectResponse>>, ApiError> {
    // Ownership re-check before any mutation.
    let existing = repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found or access denied".to_string()))?;

    let form = MultipartForm::read(multipart).await?;
    let input = validate_fields(&form).map_err(ApiError::Validation)?;

    let (screenshot, replaced) = match form.file("screenshot") {
        Some(file) => (Some(store_screenshot(&state, file).await?), true),
        None => match input.screenshot_url.clone() {
            Some(url) => (Some(url), true),
            None => (existing.screenshot.clone(), false),
        },
    };

    let changes = ProjectChanges {
        title: input.title,
        description: input.description,
        technologies: input.technologies,
        github_url: input.github_url,
        screenshot,
        category: input.category,
    };

    let project = match repo::update(&state.db, id, user_id, &changes).await {
        Ok(p) => p,
        Err(e) => {
            if replaced {
                if let Some(key) = changes.screenshot.as_deref().filter(|s| !is_external(s)) {
                    if let Err(cleanup) = state.storage.delete_object(key).await {
                        warn!(error = %cleanup, %key, "failed to clean up orphaned screenshot");
                    }
                }
            }
            return Err(e.into());
        }
    };

    // Old local file is only removed once the row points at the replacement.
    if replaced {
        if let Some(old) = existing.screenshot.as_deref() {
            delete_local_screenshot(&state, old).await;
        }
    }

    info!(project_id = %project.id, %user_id, "project updated");
    Ok(Envelope::ok(
        "Project updated successfully",
        ProjectResponse::from(&project),
    ))
}

#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let existing = repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found or access denied".to_string()))?;

    let deleted = repo::delete(&state.db, id, user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(
            "Project not found or access denied".to_string(),
        ));
    }

    // Row is gone; file cleanup is best effort.
    if let Some(screenshot) = existing.screenshot.as_deref() {
        delete_local_screenshot(&state, screenshot).await;
    }

    info!(project_id = %id, %user_id, "project deleted");
    Ok(Envelope::message("Project deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn png_upload() -> UploadedFile {
        UploadedFile {
            filename: Some("shot.png".to_string()),
            bytes: Bytes::from_static(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2]),
        }
    }

    #[tokio::test]
    async fn stored_screenshot_is_removed_with_the_project() {
        let state = AppState::fake();
        let key = store_screenshot(&state, &png_upload()).await.expect("store");
        assert!(key.starts_with("projects/project-"));
        assert!(state.storage.get_object(&key).await.unwrap().is_some());

        delete_local_screenshot(&state, &key).await;
        assert!(state.storage.get_object(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn external_screenshot_urls_are_never_deleted() {
        let state = AppState::fake();
        let key = store_screenshot(&state, &png_upload()).await.expect("store");

        delete_local_screenshot(&state, "https://example.com/shot.png").await;
        // Only local keys are eligible for cleanup.
        assert!(state.storage.get_object(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rejected_screenshot_never_reaches_storage() {
        let state = AppState::fake();
        let not_an_image = UploadedFile {
            filename: Some("shot.png".to_string()),
            bytes: Bytes::from_static(b"\x7fELF...."),
        };
        let err = store_screenshot(&state, &not_an_image).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
