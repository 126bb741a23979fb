//! Axum route handlers for the record pages and the RPC API.

use crate::pages;
use crate::store::{RecordStore, StoreError};
use axum::extract::{Form, Path, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Json, Response};
use once_cell::sync::Lazy;
use record_keeper_types::*;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub store: Arc<RecordStore>,
    pub start_time: Instant,
}

/// A record path segment: anything slugify can emit except path separators.
static SLUG_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    let stripped: String = stripped_chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    Regex::new(&format!(r"^[^/\\{}]+$", stripped)).unwrap()
});

pub fn is_routable_slug(segment: &str) -> bool {
    SLUG_SEGMENT.is_match(segment) && !is_dot_segment(segment)
}

// =====================================================
// Errors
// =====================================================

/// A failed page request, rendered as an HTML error page.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub message: String,
}

impl PageError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<StoreError> for PageError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidSlug(_) => StatusCode::BAD_REQUEST,
            StoreError::Io(_) | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("{}: {}", self.status, self.message);
        } else {
            log::warn!("{}: {}", self.status, self.message);
        }
        (self.status, Html(pages::error_page(self.status, &self.message))).into_response()
    }
}

fn checked_slug(raw: String) -> Result<String, PageError> {
    log::debug!("slug is {}", raw);
    if is_routable_slug(&raw) {
        Ok(raw)
    } else {
        Err(PageError::not_found(format!("'{}' is not a record path", raw)))
    }
}

/// 302 Found, the status browsers follow with a GET after a form post.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

// =====================================================
// Pages
// =====================================================

// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let records = state.store.list().await?;
    let summaries: Vec<RecordSummary> = records.iter().map(Record::summary).collect();
    Ok(Html(pages::index_page(&summaries)))
}

// GET /show/:slug
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, PageError> {
    let slug = checked_slug(slug)?;
    let record = state.store.load(&slug).await?;
    Ok(Html(pages::show_page(&record, &slug)))
}

// GET /edit/:slug
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, PageError> {
    let slug = checked_slug(slug)?;
    let record = state.store.load(&slug).await?;
    Ok(Html(pages::edit_page(&record, &slug)))
}

// GET /new/
pub async fn new_record() -> Html<String> {
    Html(pages::new_page())
}

// POST /create/
pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SaveRecordForm>,
) -> Result<Response, PageError> {
    let record = Record::from(form);
    let slug = state.store.save(&record).await?;
    Ok(found(&pages::record_url("show", &slug)))
}

// POST /save/:slug
//
// The record is stored under the slug of the submitted title, which is
// normally the slug in the path.
pub async fn save(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Form(form): Form<SaveRecordForm>,
) -> Result<Response, PageError> {
    let slug = checked_slug(slug)?;
    let record = Record::from(form);
    let saved_as = state.store.save(&record).await?;
    if saved_as != slug {
        log::info!("Record '{}' was saved under '{}'", slug, saved_as);
    }
    Ok(found(&pages::record_url("show", &saved_as)))
}

// POST /delete/:slug
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let slug = checked_slug(slug)?;
    state.store.delete(&slug).await?;
    Ok(found("/"))
}

pub async fn not_found(uri: Uri) -> PageError {
    PageError::not_found(format!("nothing at {}", uri.path()))
}

// =====================================================
// RPC
// =====================================================

// GET /rpc/records/list
pub async fn list_records(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<RecordSummary>>>) {
    match state.store.list().await {
        Ok(records) => (
            StatusCode::OK,
            Json(RpcResponse::ok(records.iter().map(Record::summary).collect())),
        ),
        Err(e) => {
            log::error!("Unable to load all records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RpcResponse::err(e.to_string())),
            )
        }
    }
}

// GET /rpc/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let record_count = match state.store.slugs().await {
        Ok(slugs) => slugs.len(),
        Err(e) => {
            log::error!("Unable to count records: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RpcResponse::err(e.to_string())),
            );
        }
    };
    (
        StatusCode::OK,
        Json(RpcResponse::ok(ServiceStatus {
            running: true,
            uptime_secs: state.start_time.elapsed().as_secs(),
            record_count,
            storage_dir: state.store.dir().display().to_string(),
        })),
    )
}
