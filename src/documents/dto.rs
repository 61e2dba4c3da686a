use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Document;
use crate::{storage, uploads};

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: Option<String>,
    pub file_size: i64,
    pub file_size_formatted: String,
    pub file_extension: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Document> for DocumentResponse {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            title: d.title.clone(),
            description: d.description.clone(),
            file_url: storage::public_url(&d.file_path),
            file_type: d.file_type.clone(),
            file_size: d.file_size,
            file_size_formatted: uploads::format_file_size(d.file_size),
            file_extension: uploads::file_extension(&d.file_path),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// Metadata-only update request.
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: String,
    pub description: Option<String>,
    pub document_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_derives_display_fields() {
        let doc = Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Resume".into(),
            description: None,
            file_path: "documents/doc-abc.pdf".into(),
            file_type: Some("pdf".into()),
            file_size: 2 * 1024 * 1024,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let resp = DocumentResponse::from(&doc);
        assert_eq!(resp.file_url, "/uploads/documents/doc-abc.pdf");
        assert_eq!(resp.file_size_formatted, "2.00 MB");
        assert_eq!(resp.file_extension.as_deref(), Some("pdf"));
    }
}
