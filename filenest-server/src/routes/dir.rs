//! Sandboxed directory browsing under /dir/

use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::SystemTime;

use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{DateTime, Utc};
use filenest_core::range::entity_tag;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::email::EmailSender;
use crate::error::ServerError;
use crate::pages::{self, encode_href, escape_html};
use crate::state::AppState;
use crate::store::AccountStore;
use crate::streamer::{self, StaticContent};

/// Files up to this size are read into memory and served with range support
pub const MAX_INLINE_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// GET /dir/
pub async fn browse_root<A, E>(
    State(state): State<Arc<AppState<A, E>>>,
    req: Request,
) -> Result<Response, ServerError>
where
    A: AccountStore,
    E: EmailSender,
{
    serve_path(&state.config.web_root, "", req).await
}

/// GET /dir/*path
pub async fn browse<A, E>(
    State(state): State<Arc<AppState<A, E>>>,
    Path(path): Path<String>,
    req: Request,
) -> Result<Response, ServerError>
where
    A: AccountStore,
    E: EmailSender,
{
    serve_path(&state.config.web_root, &path, req).await
}

async fn serve_path(web_root: &FsPath, requested: &str, req: Request) -> Result<Response, ServerError> {
    let target = filenest_core::resolve(web_root, requested);
    tracing::debug!(requested = %requested, target = %target.display(), "Browsing");

    let metadata = tokio::fs::metadata(&target)
        .await
        .map_err(|_| ServerError::NotFound("This path does not exist".to_string()))?;

    if metadata.is_dir() {
        let uri_path = req.uri().path().to_string();
        if !uri_path.ends_with('/') {
            return Ok(Redirect::permanent(&format!("{}/", uri_path)).into_response());
        }
        return list_directory(&target, &uri_path).await;
    }

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = mime_guess::from_path(&target)
        .first_or_octet_stream()
        .to_string();

    if metadata.len() > MAX_INLINE_FILE_SIZE {
        return serve_large_file(&target, &name, req).await;
    }

    let data = tokio::fs::read(&target)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to read {}: {}", target.display(), e)))?;

    let content = StaticContent {
        etag: entity_tag(modified_secs(metadata.modified().ok()), data.len() as u64),
        data: data.into(),
        mime,
        disposition: None,
    };
    Ok(streamer::serve(content, req.method(), req.headers()))
}

/// Stream a large file from disk as a download
async fn serve_large_file(target: &FsPath, name: &str, req: Request) -> Result<Response, ServerError> {
    tracing::debug!(file = %target.display(), "Serving large file as attachment");

    let mut response = ServeFile::new(target)
        .oneshot(req)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .into_response();

    let disposition = format!("attachment; filename=\"{}\"", name.replace('"', "_"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

struct ListingEntry {
    name: String,
    is_dir: bool,
    modified: Option<SystemTime>,
    size: u64,
}

async fn list_directory(dir: &FsPath, uri_path: &str) -> Result<Response, ServerError> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to list {}: {}", dir.display(), e)))?;

    let mut entries = Vec::new();
    while let Ok(Some(entry)) = reader.next_entry().await {
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: metadata.is_dir(),
            modified: metadata.modified().ok(),
            size: metadata.len(),
        });
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    let rows: String = entries.iter().map(listing_row).collect();
    Ok(Html(pages::listing_page(uri_path, &rows)).into_response())
}

fn listing_row(entry: &ListingEntry) -> String {
    let (href, label, size) = if entry.is_dir {
        (
            format!("{}/", encode_href(&entry.name)),
            format!("{}/", entry.name),
            "[DIR]".to_string(),
        )
    } else {
        (encode_href(&entry.name), entry.name.clone(), entry.size.to_string())
    };
    let modified = entry
        .modified
        .map(|time| DateTime::<Utc>::from(time).format("%d-%b-%Y %H:%M").to_string())
        .unwrap_or_default();

    format!(
        "    <tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>\n",
        href,
        escape_html(&label),
        modified,
        size
    )
}

fn modified_secs(modified: Option<SystemTime>) -> u64 {
    modified
        .and_then(|time| time.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
