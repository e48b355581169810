//! Document (article) endpoints.
//!
//! Article bodies travel in the block storage format from
//! `codethrone-editor`. Image uploads are multipart with a size cap
//! enforced here, before any request goes out.

use crate::infrastructure::dto::http::{
    CreateDocumentRequest, CreateSubjectRequest, DocumentDto, SubjectDto, UpdateDocumentRequest,
    UploadImageResponse,
};

use super::client::{ApiClient, ApiError};

/// Client-side cap on image uploads (2MB)
pub const MAX_IMAGE_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

impl ApiClient {
    /// `GET /documents/subjects`
    pub async fn subjects(&self) -> Result<Vec<SubjectDto>, ApiError> {
        self.get_json("/documents/subjects").await
    }

    /// `POST /documents/subjects`
    pub async fn create_subject(&self, name: &str) -> Result<SubjectDto, ApiError> {
        self.post_json(
            "/documents/subjects",
            &CreateSubjectRequest {
                name: name.to_string(),
            },
        )
        .await
    }

    /// `GET /documents/:id`
    pub async fn document(&self, document_id: &str) -> Result<DocumentDto, ApiError> {
        self.get_json(&format!("/documents/{}", document_id)).await
    }

    /// `POST /documents`
    pub async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<DocumentDto, ApiError> {
        self.post_json("/documents", request).await
    }

    /// `PUT /documents/:id`
    pub async fn update_document(
        &self,
        document_id: &str,
        request: &UpdateDocumentRequest,
    ) -> Result<DocumentDto, ApiError> {
        self.put_json(&format!("/documents/{}", document_id), request)
            .await
    }

    /// `DELETE /documents/:id`
    pub async fn delete_document(&self, document_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/documents/{}", document_id))
            .await
    }

    /// `POST /documents/upload-image` (multipart)
    ///
    /// Rejects payloads over [`MAX_IMAGE_UPLOAD_BYTES`] without issuing a
    /// request.
    pub async fn upload_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadImageResponse, ApiError> {
        if bytes.len() > MAX_IMAGE_UPLOAD_BYTES {
            return Err(ApiError::Validation(format!(
                "image exceeds the {}MB upload limit",
                MAX_IMAGE_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        self.execute_json(
            self.request(reqwest::Method::POST, "/documents/upload-image")
                .multipart(form),
        )
        .await
    }

    /// `DELETE /documents/delete-image/:publicId`
    pub async fn delete_image(&self, public_id: &str) -> Result<(), ApiError> {
        self.delete_unit(&format!("/documents/delete-image/{}", public_id))
            .await
    }
}
