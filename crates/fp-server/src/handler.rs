use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use fp_index::ReconcileReport;
use fp_service::{AssetUpload, MarkdownBody, SaveReceipt, DEFAULT_MEDIA_TYPE, MARKDOWN_CONTENT_TYPE};
use fp_types::{Asset, Document, Folder, RecordId, UploadReceipt};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Multipart part carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
    pub documents: usize,
}

/// Health check handler.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.service.provider().kind().to_string(),
        documents: state.index.len(),
    })
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "flowerpress",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(v)| v)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

// ---------------------------------------------------------------------
// Markdown bodies
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMarkdownRequest {
    pub markdown: Option<String>,
    /// When set, the save only succeeds if the stored body still has this
    /// etag.
    pub expected_etag: Option<String>,
}

pub async fn get_markdown(
    State(state): State<AppState>,
    Path((space_id, slug)): Path<(String, String)>,
) -> ServerResult<Json<MarkdownBody>> {
    let body = state.service.get_markdown(&space_id, &slug).await?;
    Ok(Json(body))
}

pub async fn save_markdown(
    State(state): State<AppState>,
    Path((space_id, slug)): Path<(String, String)>,
    body: Result<Json<SaveMarkdownRequest>, JsonRejection>,
) -> ServerResult<Json<SaveReceipt>> {
    let req = json_body(body)?;
    let markdown = req
        .markdown
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ServerError::BadRequest("markdown content is required".into()))?;

    let receipt = state
        .service
        .save_markdown_if(&space_id, &slug, &markdown, req.expected_etag.as_deref())
        .await?;
    state
        .index
        .record_save(&space_id, &slug, &receipt.version, &receipt.etag);
    Ok(Json(receipt))
}

// ---------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------

pub async fn list_assets(
    State(state): State<AppState>,
    Path((space_id, slug)): Path<(String, String)>,
) -> ServerResult<Json<Vec<Asset>>> {
    Ok(Json(state.service.list_assets(&space_id, &slug).await?))
}

pub async fn upload_asset(
    State(state): State<AppState>,
    Path((space_id, slug)): Path<(String, String)>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadReceipt>> {
    let mut upload: Option<AssetUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(multipart_error)?;
        upload = Some(AssetUpload {
            name,
            content,
            content_type,
        });
    }

    let upload = upload.ok_or_else(|| ServerError::BadRequest("no file provided".into()))?;
    let receipt = state.service.upload_asset(&space_id, &slug, upload).await?;
    Ok(Json(receipt))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(e.body_text())
    }
}

// ---------------------------------------------------------------------
// Documents and folders
// ---------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub title: Option<String>,
    pub folder_id: Option<RecordId>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent_id: Option<RecordId>,
}

#[derive(Debug, Serialize)]
pub struct FilesystemResponse {
    pub folders: Vec<Folder>,
    pub documents: Vec<Document>,
}

/// Create a document and write its initial body.
///
/// If the body cannot be written the index entry is dropped again.
pub async fn create_document(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
    body: Result<Json<CreateDocumentRequest>, JsonRejection>,
) -> ServerResult<Json<Document>> {
    let req = json_body(body)?;
    let mut doc = state
        .index
        .create_document(&space_id, req.title.as_deref(), req.folder_id)?;

    match state.service.save_markdown(&space_id, &doc.slug, &doc.markdown).await {
        Ok(receipt) => {
            state
                .index
                .record_save(&space_id, &doc.slug, &receipt.version, &receipt.etag);
            if let Some(stamped) = state.index.get(&doc.id) {
                doc = stamped;
            }
            Ok(Json(doc))
        }
        Err(e) => {
            state.index.remove(&doc.id);
            Err(e.into())
        }
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
) -> Json<Vec<Document>> {
    Json(state.index.documents_in_space(&space_id))
}

fn document_in_space(state: &AppState, space_id: &str, id: &RecordId) -> ServerResult<Document> {
    state
        .index
        .get(id)
        .filter(|d| d.space_id == space_id)
        .ok_or_else(|| ServerError::NotFound(format!("document not found: {id}")))
}

pub async fn rename_document(
    State(state): State<AppState>,
    Path((space_id, id)): Path<(String, String)>,
    body: Result<Json<RenameRequest>, JsonRejection>,
) -> ServerResult<Json<Document>> {
    let req = json_body(body)?;
    let id = RecordId::from_string(id);
    document_in_space(&state, &space_id, &id)?;
    Ok(Json(state.index.rename(&id, &req.name)?))
}

/// Remove a document from the index. Stored bodies and assets are kept.
pub async fn delete_document(
    State(state): State<AppState>,
    Path((space_id, id)): Path<(String, String)>,
) -> Json<serde_json::Value> {
    let id = RecordId::from_string(id);
    if document_in_space(&state, &space_id, &id).is_ok() {
        state.index.remove(&id);
    }
    Json(json!({ "success": true }))
}

pub async fn create_folder(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
    body: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> ServerResult<Json<Folder>> {
    let req = json_body(body)?;
    Ok(Json(state.index.create_folder(&space_id, &req.name, req.parent_id)?))
}

/// Folders and documents of a space, after merging in documents found on
/// disk.
pub async fn filesystem(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
) -> ServerResult<Json<FilesystemResponse>> {
    if let Some(reconciler) = &state.reconciler {
        let report: ReconcileReport = reconciler.reconcile(&space_id, &state.index).await?;
        debug!(space = %space_id, ?report, "reconciled before listing");
    } else {
        fp_types::validate_segment("space id", &space_id).map_err(fp_index::IndexError::from)?;
    }
    Ok(Json(FilesystemResponse {
        folders: state.index.folders_in_space(&space_id),
        documents: state.index.documents_in_space(&space_id),
    }))
}

// ---------------------------------------------------------------------
// Raw objects
// ---------------------------------------------------------------------

/// Serve stored bytes with their recorded content type.
pub async fn storage_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Response> {
    let object = state
        .service
        .read_object(&key)
        .await?
        .ok_or_else(|| ServerError::NotFound("file not found".into()))?;

    let content_type = object.content_type.unwrap_or_else(|| {
        if key.ends_with(".md") {
            MARKDOWN_CONTENT_TYPE.to_string()
        } else {
            DEFAULT_MEDIA_TYPE.to_string()
        }
    });
    Ok((
        [(header::CONTENT_TYPE, content_type)],
        Body::from(object.payload.into_bytes()),
    )
        .into_response())
}
