use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, warn};

use crate::discovery::models::MediaKind;
use crate::models::models::WishRequest;
use crate::playback::plan::PlaybackPlan;
use crate::render::page::{render_page, RenderOptions};
use crate::service::composer::compose;
use crate::service::state::AppState;

/// `GET /` sends visitors to the greeting for the configured name.
pub async fn index(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(&format!(
        "/wish?name={}",
        urlencoding::encode(&state.page.redirect_name)
    ))
}

/// `GET /wish?name=...`
pub async fn wish(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Html<String>, StatusCode> {
    let request = WishRequest::from_query(pairs);
    let assets = state.resolver.resolve().await;
    let plan = PlaybackPlan::for_media(assets.presence());
    let model = compose(&request, assets, &state.page.templates);

    debug!(name = %model.name_display, "rendering wish page");

    let options = RenderOptions {
        show_asset_panel: state.page.show_asset_panel,
    };
    render_page(&model, &plan, options).map(Html).map_err(|e| {
        error!("Failed to render wish page: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// `GET /debug_assets` reports what the server sees on disk right now.
pub async fn debug_assets(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    if !state.debug_assets {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(state.resolver.inspect().await).into_response())
}

/// Serve a file from the media or audio directory, in partial content
/// (Range) if requested, or full if no Range is given.
///
/// Example usage: GET /static/media/birthday.mp4
pub async fn stream_media(
    State(state): State<Arc<AppState>>,
    Path((segment, file_name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let kind = MediaKind::from_segment(&segment).ok_or(StatusCode::NOT_FOUND)?;
    let path = state
        .resolver
        .locate(kind, &file_name)
        .ok_or(StatusCode::NOT_FOUND)?;

    let meta = tokio::fs::metadata(&path).await.map_err(|_| StatusCode::NOT_FOUND)?;
    if !meta.is_file() {
        return Err(StatusCode::NOT_FOUND);
    }
    let file_size = meta.len();
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    let range_header = headers.get(header::RANGE).and_then(|val| val.to_str().ok());

    // No Range header: return the entire file
    let Some(range_str) = range_header else {
        let file = File::open(&path).await.map_err(|_| StatusCode::NOT_FOUND)?;
        let body = Body::from_stream(ReaderStream::new(file));

        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type.as_ref())
            .header(header::CONTENT_LENGTH, file_size)
            .header(header::ACCEPT_RANGES, "bytes")
            .body(body)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR);
    };

    let (start, end) = match parse_range_header(range_str, file_size) {
        Ok(range) => range,
        Err(status) if status == StatusCode::RANGE_NOT_SATISFIABLE => {
            warn!("Unsatisfiable range {range_str} for {}", path.display());
            return Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{file_size}"))
                .body(Body::empty())
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(status) => return Err(status),
    };
    let chunk_size = end - start + 1;

    let mut file = File::open(&path).await.map_err(|_| StatusCode::NOT_FOUND)?;
    file.seek(SeekFrom::Start(start))
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    // Only read `chunk_size` bytes
    let limited_reader = file.take(chunk_size);
    let body = Body::from_stream(ReaderStream::new(limited_reader));

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, chunk_size)
        .header(header::CONTENT_RANGE, format!("bytes {start}-{end}/{file_size}"))
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// A simple Range header parser for a single `bytes=` range.
///
/// "bytes=0-1023" => (0, 1023), "bytes=100-" => (100, size-1),
/// "bytes=-500" => the last 500 bytes. The end is clamped to the file.
fn parse_range_header(range_str: &str, file_size: u64) -> Result<(u64, u64), StatusCode> {
    let bounds = range_str
        .strip_prefix("bytes=")
        .ok_or(StatusCode::BAD_REQUEST)?
        .trim();
    let (start_str, end_str) = bounds.split_once('-').ok_or(StatusCode::BAD_REQUEST)?;

    if file_size == 0 {
        return Err(StatusCode::RANGE_NOT_SATISFIABLE);
    }
    let last = file_size - 1;

    if start_str.is_empty() {
        // "bytes=-N" means the final N bytes
        let suffix: u64 = end_str.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
        if suffix == 0 {
            return Err(StatusCode::RANGE_NOT_SATISFIABLE);
        }
        return Ok((file_size.saturating_sub(suffix), last));
    }

    let start: u64 = start_str.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    let end = if end_str.is_empty() {
        last
    } else {
        end_str.parse::<u64>().map_err(|_| StatusCode::BAD_REQUEST)?
    };

    if end < start {
        return Err(StatusCode::BAD_REQUEST);
    }
    if start > last {
        return Err(StatusCode::RANGE_NOT_SATISFIABLE);
    }
    Ok((start, end.min(last)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_header() {
        assert_eq!(parse_range_header("bytes=0-1023", 4096), Ok((0, 1023)));
        assert_eq!(parse_range_header("bytes=100-", 4096), Ok((100, 4095)));
        assert_eq!(parse_range_header("bytes=-96", 4096), Ok((4000, 4095)));
        assert_eq!(parse_range_header("bytes=0-99999", 10), Ok((0, 9)));
        assert_eq!(parse_range_header("bytes=-99999", 10), Ok((0, 9)));
    }

    #[test]
    fn test_parse_range_header_rejects() {
        assert_eq!(
            parse_range_header("items=0-1", 10),
            Err(StatusCode::BAD_REQUEST)
        );
        assert_eq!(parse_range_header("bytes=a-b", 10), Err(StatusCode::BAD_REQUEST));
        assert_eq!(parse_range_header("bytes=5-2", 10), Err(StatusCode::BAD_REQUEST));
        assert_eq!(
            parse_range_header("bytes=10-", 10),
            Err(StatusCode::RANGE_NOT_SATISFIABLE)
        );
        assert_eq!(
            parse_range_header("bytes=0-", 0),
            Err(StatusCode::RANGE_NOT_SATISFIABLE)
        );
    }
}
