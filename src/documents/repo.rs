use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str =
    "id, user_id, title, description, file_path, file_type, file_size, created_at, updated_at";

/// Document row. `file_path` is a storage key under the upload root.
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub struct NewDocument {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: i64,
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Document>> {
    let rows = sqlx::query_as::<_, Document>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Ownership check: the row only comes back when it belongs to `user_id`.
pub async fn find_owned(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Document>> {
    let row = sqlx::query_as::<_, Document>(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(db: &PgPool, new: &NewDocument) -> anyhow::Result<Document> {
    let document = sqlx::query_as::<_, Document>(&format!(
        "INSERT INTO documents (user_id, title, description, file_path, file_type, file_size) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {DOCUMENT_COLUMNS}"
    ))
    .bind(new.user_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.file_path)
    .bind(&new.file_type)
    .bind(new.file_size)
    .fetch_one(db)
    .await?;
    Ok(document)
}

/// Metadata-only update; the stored file is never touched here.
pub async fn update_metadata(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    title: &str,
    description: Option<&str>,
    file_type: Option<&str>,
) -> anyhow::Result<Document> {
    let document = sqlx::query_as::<_, Document>(&format!(
        "UPDATE documents \
         SET title = $1, description = $2, file_type = $3, updated_at = now() \
         WHERE id = $4 AND user_id = $5 \
         RETURNING {DOCUMENT_COLUMNS}"
    ))
    .bind(title)
    .bind(description)
    .bind(file_type)
    .bind(id)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(document)
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
