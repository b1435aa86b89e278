//! Buffered decoding of `multipart/form-data` request bodies.
//!
//! Mount uploads address their parts by name (`count`, `file_0`, `filemod_0`, ...)
//! in any order, so the whole form is read before it is interpreted.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{HeaderMap, header};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("request Content-Type isn't multipart/form-data")]
    NotMultipart,
    #[error("{0}")]
    Malformed(String),
}

/// A file part of a form.
#[derive(Debug, Clone)]
pub struct FormFile {
    /// Filename given in the part's `Content-Disposition`.
    pub file_name: String,
    pub content: Bytes,
}

/// A fully buffered multipart form.
#[derive(Debug, Default)]
pub struct MountForm {
    values: HashMap<String, String>,
    files: HashMap<String, FormFile>,
}

impl MountForm {
    /// Read every part of the request body.
    ///
    /// Parts carrying a filename are kept as files, the rest as text values.
    /// When a name repeats, the first occurrence wins.
    pub async fn from_request(request: Request) -> Result<Self, FormError> {
        if !is_multipart_form(request.headers()) {
            return Err(FormError::NotMultipart);
        }

        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| FormError::Malformed(e.body_text()))?;

        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| FormError::Malformed(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content = field
                        .bytes()
                        .await
                        .map_err(|e| FormError::Malformed(e.body_text()))?;
                    form.files
                        .entry(name)
                        .or_insert(FormFile { file_name, content });
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| FormError::Malformed(e.body_text()))?;
                    form.values.entry(name).or_insert(text);
                }
            }
        }

        Ok(form)
    }

    /// The text value of `name`. An empty value counts as absent.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn file(&self, name: &str) -> Option<&FormFile> {
        self.files.get(name)
    }
}

fn is_multipart_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("multipart/form-data"))
}
