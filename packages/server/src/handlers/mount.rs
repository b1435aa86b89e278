use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use batches_common::timestamp::parse_modified_at;
use batches_common::{
    BatchSpecMount, GetBatchSpecMountOpts, GetBatchSpecOpts, ListBatchSpecMountsOpts,
};
use serde::Deserialize;
use tracing::{Span, debug, info, instrument};

use crate::error::{MountError, UploadError};
use crate::multipart::MountForm;
use crate::policy::MountAction;
use crate::state::MountState;

pub fn mount_upload_body_limit(max: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max)
}

/// Path variables of `/batches/mount/{spec}[/{mount}]`.
#[derive(Debug, Deserialize)]
pub struct MountPath {
    /// Batch spec rand id.
    pub spec: String,
    /// Mount rand id. Absent on the upload route.
    pub mount: Option<String>,
}

/// Single entry point for both mount routes; dispatches on the method.
#[instrument(
    skip_all,
    fields(
        caller = %state.caller,
        %method,
        spec = %params.spec,
        mount = ?params.mount,
        count = tracing::field::Empty,
    )
)]
pub async fn serve_mount(
    State(state): State<MountState>,
    method: Method,
    Path(params): Path<MountPath>,
    request: Request,
) -> Response {
    let mount_id = params.mount.as_deref().filter(|id| !id.is_empty());

    let result = match method {
        Method::GET => download(&state, mount_id).await,
        Method::HEAD => check_exists(&state, mount_id).await,
        Method::POST => upload(&state, &params.spec, request).await,
        _ => Ok(method_not_allowed()),
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

#[utoipa::path(
    get,
    path = "/batches/mount/{spec}/{mount}",
    tag = "Batch Spec Mounts",
    operation_id = "downloadMount",
    summary = "Download a mount file",
    description = "Returns the raw content of the mount, untransformed.",
    params(
        ("spec" = String, Path, description = "Batch spec rand id"),
        ("mount" = String, Path, description = "Mount rand id"),
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Mount id not provided"),
        (status = 500, description = "Mount lookup failed"),
    ),
)]
pub async fn download(state: &MountState, mount_id: Option<&str>) -> Result<Response, MountError> {
    let mount_id = mount_id.ok_or(MountError::MissingMountId)?;
    state.policy.authorize(state.caller, MountAction::Download)?;

    let mount = state
        .store
        .get_batch_spec_mount(GetBatchSpecMountOpts {
            rand_id: mount_id.to_string(),
        })
        .await
        .map_err(MountError::LookupMount)?;

    debug!(
        path = %mount.path,
        file_name = %mount.file_name,
        size = mount.size,
        "Serving mount file"
    );

    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        )],
        mount.content,
    )
        .into_response())
}

#[utoipa::path(
    head,
    path = "/batches/mount/{spec}/{mount}",
    tag = "Batch Spec Mounts",
    operation_id = "mountExists",
    summary = "Check whether a mount file exists",
    params(
        ("spec" = String, Path, description = "Batch spec rand id"),
        ("mount" = String, Path, description = "Mount rand id"),
    ),
    responses(
        (status = 200, description = "Mount exists"),
        (status = 404, description = "Mount does not exist"),
        (status = 400, description = "Mount id not provided"),
        (status = 500, description = "Count failed"),
    ),
)]
pub async fn check_exists(
    state: &MountState,
    mount_id: Option<&str>,
) -> Result<Response, MountError> {
    let mount_id = mount_id.ok_or(MountError::MissingMountId)?;
    state
        .policy
        .authorize(state.caller, MountAction::CheckExists)?;

    let count = state
        .store
        .count_batch_spec_mounts(ListBatchSpecMountsOpts {
            rand_id: Some(mount_id.to_string()),
            ..Default::default()
        })
        .await
        .map_err(MountError::CheckExists)?;

    let status = if count > 0 {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok(status.into_response())
}

#[utoipa::path(
    post,
    path = "/batches/mount/{spec}",
    tag = "Batch Spec Mounts",
    operation_id = "uploadMounts",
    summary = "Upload mount files to a batch spec",
    description = "Uploads `count` files in one form. File `i` is described by the fields \
        `filemod_i` (modification time, `2006-01-02 15:04:05.999999999 -0700 MST`), \
        `filepath_i` (logical directory) and the file part `file_i`. Files are stored in \
        index order; re-uploading the same path and filename replaces the content. \
        Processing stops at the first failing file and earlier files stay stored.",
    params(("spec" = String, Path, description = "Batch spec rand id")),
    request_body(content_type = "multipart/form-data", description = "Index-addressed file batch"),
    responses(
        (status = 200, description = "Every file stored"),
        (status = 400, description = "Not a multipart form, or missing/invalid count"),
        (status = 500, description = "Batch spec lookup or file upload failed"),
    ),
)]
pub async fn upload(
    state: &MountState,
    spec_id: &str,
    request: Request,
) -> Result<Response, MountError> {
    state.policy.authorize(state.caller, MountAction::Upload)?;

    let form = MountForm::from_request(request).await?;
    let count: u32 = form.value("count").ok_or(MountError::MissingCount)?.parse()?;
    Span::current().record("count", count);

    let spec = state
        .store
        .get_batch_spec(GetBatchSpecOpts {
            rand_id: spec_id.to_string(),
        })
        .await
        .map_err(MountError::LookupBatchSpec)?;

    // Sequential and index-ordered. Files stored before a failure are kept.
    for index in 0..count {
        let mount = mount_from_form(&form, spec.id, index)?;
        let stored = state
            .store
            .upsert_batch_spec_mount(&mount)
            .await
            .map_err(UploadError::from)?;

        info!(
            index,
            rand_id = %stored.rand_id,
            path = %stored.path,
            file_name = %stored.file_name,
            size = stored.size,
            "Stored mount file"
        );
    }

    info!(count, batch_spec_id = spec.id, "Mount upload complete");
    Ok(StatusCode::OK.into_response())
}

/// Assemble the mount described by the `index`-th group of form fields.
fn mount_from_form(
    form: &MountForm,
    batch_spec_id: i64,
    index: u32,
) -> Result<BatchSpecMount, UploadError> {
    let modified_at = form
        .value(&format!("filemod_{index}"))
        .ok_or(UploadError::MissingModifiedTime)?;
    let modified_at = parse_modified_at(modified_at)?;

    let path = form.value(&format!("filepath_{index}")).unwrap_or_default();

    let file = form
        .file(&format!("file_{index}"))
        .ok_or(UploadError::MissingFile)?;

    Ok(BatchSpecMount::new(
        batch_spec_id,
        path,
        file.file_name.clone(),
        file.content.to_vec(),
        modified_at,
    ))
}

fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, HeaderValue::from_static("GET, HEAD, POST"))],
    )
        .into_response()
}
