// Multipart form parsing for the endpoints that accept file uploads
// (register, profile update, post creation).

use std::collections::HashMap;

use axum::{body::Bytes, extract::Multipart};

use crate::utils::service_error::ApiError;

/// An uploaded file captured from a multipart field.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content: Bytes,
}

/// All fields of a multipart request, text and files separated.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, FileUpload>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&FileUpload> {
        self.files.get(name)
    }
}

/// Drains the multipart stream into a [`FormData`]. Fields carrying a
/// filename are treated as uploads, everything else as text.
pub async fn parse_form(multipart: &mut Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "multipart stream aborted");
        ApiError::Validation("Parâmetros de entrada não informados".to_string())
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(filename) = field.file_name().map(str::to_string) {
            let content = field.bytes().await.map_err(|e| {
                tracing::warn!(field = %name, error = %e, "failed to read upload");
                ApiError::Validation("Parâmetros de entrada não informados".to_string())
            })?;
            form.files.insert(name, FileUpload { filename, content });
        } else {
            let value = field.text().await.map_err(|_| {
                ApiError::Validation("Parâmetros de entrada não informados".to_string())
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
