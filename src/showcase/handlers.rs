use axum::{extract::State, Json};
use tracing::instrument;

use crate::{
    auth::services::MaybeAuthUser, error::ApiError, response::Envelope, state::AppState,
};

use super::dto::{DocumentCard, MemberCard, ProjectCard, ShowcaseResponse};
use super::repo;

/// Public read-only aggregation across all users' content.
#[instrument(skip(state))]
pub async fn get_showcase(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Envelope<ShowcaseResponse>>, ApiError> {
    let members = repo::recent_members(&state.db).await?;
    let projects = repo::recent_projects(&state.db).await?;
    let documents = repo::recent_documents(&state.db).await?;
    let total_members = repo::member_count(&state.db).await?;

    Ok(Envelope::ok(
        "Community data retrieved successfully",
        ShowcaseResponse {
            members: members.iter().map(MemberCard::from).collect(),
            projects: projects.iter().map(ProjectCard::from).collect(),
            documents: documents.iter().map(DocumentCard::from).collect(),
            total_members,
            is_logged_in: viewer.is_some(),
        },
    ))
}
