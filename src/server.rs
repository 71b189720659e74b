//! HTTP surface: an explicit route table over a [`ZipService`].
//!
//! | Path    | Params        | Response              |
//! |---------|---------------|-----------------------|
//! | `/zip`  | `url`         | listing, cached or refreshed |
//! | `/file` | `url`, `file` | one cached file       |
//! | `/read` | `url`         | listing, always refreshed |
//! | `/view` | none          | empty                 |
//!
//! Every failure becomes a plain-text 500.

use axum::{
    Json, Router,
    extract::{OriginalUri, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::ZvError;
use crate::model::{ArchiveRecord, FileRecord};
use crate::service::ZipService;

/// Query parameters. Missing ones arrive as empty strings.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArchiveParams {
    pub url: String,
    pub file: String,
}

impl ArchiveParams {
    /// Pick `url` and `file` out of decoded query pairs. The first occurrence
    /// of a repeated key wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut url = None;
        let mut file = None;
        for (key, value) in pairs {
            match key.as_str() {
                "url" if url.is_none() => url = Some(value),
                "file" if file.is_none() => file = Some(value),
                _ => {}
            }
        }

        Self {
            url: url.unwrap_or_default(),
            file: file.unwrap_or_default(),
        }
    }
}

type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// A handler failure, tagged with the path it happened on for logging.
pub struct HandlerError {
    path: String,
    error: ZvError,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        error!(path = %self.path, error = %self.error, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Internal Server Error: {}", self.error),
        )
            .into_response()
    }
}

type HandlerResult<T> = Result<Json<T>, HandlerError>;

/// Malformed query strings fail like any other error instead of axum's 400.
fn params(uri: &OriginalUri, query: QueryPairs) -> Result<ArchiveParams, HandlerError> {
    query
        .map(|Query(pairs)| ArchiveParams::from_pairs(pairs))
        .map_err(|e| fail(uri)(ZvError::Parse(e.body_text())))
}

fn fail(uri: &OriginalUri) -> impl FnOnce(ZvError) -> HandlerError + '_ {
    move |error| HandlerError {
        path: uri.path().to_string(),
        error,
    }
}

/// Build the route table. The service is the only shared state.
///
/// Routes answer any method; parameters are always read from the query string.
pub fn router(service: ZipService) -> Router {
    Router::new()
        .route("/view", any(view_handler))
        .route("/zip", any(zip_handler))
        .route("/file", any(file_handler))
        .route("/read", any(read_handler))
        .with_state(service)
}

/// /view - placeholder
async fn view_handler() -> StatusCode {
    StatusCode::OK
}

/// /zip?url= - cached listing, refreshed when missing or expired
async fn zip_handler(
    State(service): State<ZipService>,
    uri: OriginalUri,
    query: QueryPairs,
) -> HandlerResult<ArchiveRecord> {
    let params = params(&uri, query)?;
    let record = service.serve_listing(&params.url).await.map_err(fail(&uri))?;
    Ok(Json(record))
}

/// /file?url=&file= - one cached file, never refreshes
async fn file_handler(
    State(service): State<ZipService>,
    uri: OriginalUri,
    query: QueryPairs,
) -> HandlerResult<FileRecord> {
    let params = params(&uri, query)?;
    let record = service
        .serve_file(&params.url, &params.file)
        .await
        .map_err(fail(&uri))?;
    Ok(Json(record))
}

/// /read?url= - unconditional refresh, answers with the new listing
async fn read_handler(
    State(service): State<ZipService>,
    uri: OriginalUri,
    query: QueryPairs,
) -> HandlerResult<ArchiveRecord> {
    let params = params(&uri, query)?;
    let record = service.refresh(&params.url).await.map_err(fail(&uri))?;
    Ok(Json(record))
}

/// Bind `addr` and serve `app` until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_value_wins() {
        let params = ArchiveParams::from_pairs(pairs(&[
            ("url", "http://a/1.zip"),
            ("file", "a.txt"),
            ("url", "http://a/2.zip"),
            ("file", "b.txt"),
        ]));

        assert_eq!(params.url, "http://a/1.zip");
        assert_eq!(params.file, "a.txt");
    }

    #[test]
    fn test_missing_and_unknown_keys() {
        let params = ArchiveParams::from_pairs(pairs(&[("other", "x")]));
        assert_eq!(params, ArchiveParams::default());
    }
}
