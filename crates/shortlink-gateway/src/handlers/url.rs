use crate::error::{AppError, Result};
use crate::model::{InfoQuery, ShortenRequest, ShortenResponse};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortlink_core::UrlDetail;

/// `POST /api/shorten`
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;

    let code = state
        .shortener()
        .shorten(&request.url, request.expiration_in_minutes)
        .await?;

    let body = ShortenResponse {
        short_link: code.to_string(),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// `GET /api/info?shortlink=<code>`
pub async fn info_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<InfoQuery>, QueryRejection>,
) -> Result<Json<UrlDetail>> {
    let Query(query) = query?;
    let code = query
        .shortlink
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing shortlink parameter".to_string()))?;

    let detail = state.shortener().short_link_info(&code).await?;
    Ok(Json(detail))
}

/// `GET /{short_code}`, answered with a temporary redirect so every visit
/// reaches the service.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let url = state.shortener().unshorten(&short_code).await?;

    let location = HeaderValue::try_from(url)
        .map_err(|e| AppError::Internal(format!("stored url is not a valid location: {e}")))?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
