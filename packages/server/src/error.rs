use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use batches_common::StoreError;
use batches_common::timestamp::TimestampError;
use thiserror::Error;

use crate::multipart::FormError;
use crate::policy::PolicyDenied;

/// Failure while materializing or storing one uploaded file.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("missing file modification time")]
    MissingModifiedTime,
    #[error(transparent)]
    InvalidModifiedTime(#[from] TimestampError),
    /// Wording is shared with existing executor clients.
    #[error("http: no such file")]
    MissingFile,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors answered by the mount endpoints.
///
/// The `Display` output is the exact response body, minus the trailing newline.
#[derive(Debug, Error)]
pub enum MountError {
    #[error("mount id not provided")]
    MissingMountId,
    #[error("failed to parse multipart form: {0}")]
    InvalidForm(#[from] FormError),
    #[error("count was not provided")]
    MissingCount,
    #[error("count is not a number: {0}")]
    InvalidCount(#[from] std::num::ParseIntError),
    #[error("{0}")]
    Forbidden(#[from] PolicyDenied),
    #[error("failed to lookup batch spec: {0}")]
    LookupBatchSpec(#[source] StoreError),
    #[error("failed to lookup mount file metadata: {0}")]
    LookupMount(#[source] StoreError),
    #[error("failed to check if file exists: {0}")]
    CheckExists(#[source] StoreError),
    #[error("failed to upload file: {0}")]
    Upload(#[from] UploadError),
}

impl MountError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingMountId
            | Self::InvalidForm(_)
            | Self::MissingCount
            | Self::InvalidCount(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::LookupBatchSpec(_)
            | Self::LookupMount(_)
            | Self::CheckExists(_)
            | Self::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MountError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Mount request failed: {}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "Mount request rejected: {}", self);
        }

        plain_text(status, self.to_string())
    }
}

/// A one-line `text/plain` response. A trailing newline is appended.
pub fn plain_text(status: StatusCode, message: impl Into<String>) -> Response {
    let mut body = message.into();
    body.push('\n');

    (
        status,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        ],
        body,
    )
        .into_response()
}
