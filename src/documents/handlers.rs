use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    response::Envelope,
    state::AppState,
    uploads::{self, MultipartForm},
};

use super::dto::{DocumentResponse, UpdateDocumentRequest};
use super::repo::{self, NewDocument};

#[instrument(skip(state))]
pub async fn list_documents(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<Vec<DocumentResponse>>>, ApiError> {
    let documents = repo::list_by_user(&state.db, user_id).await?;
    Ok(Envelope::ok(
        "Documents retrieved successfully",
        documents.iter().map(DocumentResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_document(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<DocumentResponse>>, ApiError> {
    let document = repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found or access denied".to_string()))?;
    Ok(Envelope::ok(
        "Document retrieved successfully",
        DocumentResponse::from(&document),
    ))
}

#[instrument(skip(state, multipart))]
pub async fn upload_document(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<DocumentResponse>>), ApiError> {
    let form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let title = form.text("title").unwrap_or_default().to_string();
    if title.is_empty() {
        errors.push("Document title is required.".to_string());
    }

    let file = form.file("document_file");
    let mut sniffed = None;
    match file {
        None => errors.push("Please select a file to upload.".to_string()),
        Some(f) => match uploads::validate_upload(
            f,
            uploads::ALLOWED_DOCUMENT_TYPES,
            state.config.uploads.max_file_size,
        ) {
            Ok(mime) => sniffed = Some(mime),
            Err(e) => errors.push(e),
        },
    }

    // Nothing is stored and nothing is inserted until validation passes.
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let Some(file) = file else {
        return Err(ApiError::Validation(vec![
            "Please select a file to upload.".to_string(),
        ]));
    };

    let file_type = form
        .text("document_type")
        .map(|s| s.to_string())
        .or_else(|| file.filename.as_deref().and_then(uploads::file_extension))
        .or_else(|| sniffed.map(|s| s.to_string()));

    let key = uploads::storage_key("documents", "doc", file.filename.as_deref());
    state.storage.put_object(&key, file.bytes.clone()).await?;

    let new = NewDocument {
        user_id,
        title,
        description: form.text("description").map(|s| s.to_string()),
        file_path: key.clone(),
        file_type,
        file_size: file.bytes.len() as i64,
    };

    let document = match repo::insert(&state.db, &new).await {
        Ok(d) => d,
        Err(e) => {
            // Insert failed after the file move; remove the orphan.
            if let Err(cleanup) = state.storage.delete_object(&key).await {
                warn!(error = %cleanup, %key, "failed to clean up orphaned document file");
            }
            return Err(e.into());
        }
    };

    info!(document_id = %document.id, %user_id, "document uploaded");
    Ok((
        StatusCode::CREATED,
        Envelope::ok(
            "Document uploaded successfully",
            DocumentResponse::from(&document),
        ),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_document(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<Json<Envelope<DocumentResponse>>, ApiError> {
    // Ownership re-check before any mutation.
    repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found or access denied".to_string()))?;

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation(vec![
            "Document title is required.".to_string(),
        ]));
    }

    let document = repo::update_metadata(
        &state.db,
        id,
        user_id,
        &title,
        payload.description.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        payload.document_type.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    )
    .await?;

    Ok(Envelope::ok(
        "Document updated successfully",
        DocumentResponse::from(&document),
    ))
}

#[instrument(skip(state))]
pub async fn delete_document(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let document = repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found or access denied".to_string()))?;

    let deleted = repo::delete(&state.db, id, user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(
            "Document not found or access denied".to_string(),
        ));
    }

    // Row is gone; file cleanup is best effort.
    if let Err(e) = state.storage.delete_object(&document.file_path).await {
        warn!(error = %e, key = %document.file_path, "failed to delete document file");
    }

    info!(document_id = %id, %user_id, "document deleted");
    Ok(Envelope::message("Document deleted successfully"))
}

#[instrument(skip(state))]
pub async fn download_document(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let document = repo::find_owned(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found or access denied".to_string()))?;

    let body = state
        .storage
        .get_object(&document.file_path)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found on server".to_string()))?;

    let content_type = uploads::sniff_mime(&body).unwrap_or("application/octet-stream");
    let ext = uploads::file_extension(&document.file_path).unwrap_or_else(|| "bin".to_string());
    // Attachment name comes from the stored title, not the storage key.
    let filename = format!("{}.{ext}", document.title.replace(['"', '\\'], "_"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
