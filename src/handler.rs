use crate::app::{App, LinkError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tinylink_rs::{
    DailyClicks, HealthResponse, LinkStats, ResolvedLinkResponse, ShortenRequest, ShortenResponse,
};
use tracing::{error, info};

pub enum AppError {
    BadRequest(String),
    NotFound,
    MethodNotAllowed,
    Internal(anyhow::Error),
}

// Tell axum how to convert `AppError` into a response.
// Internal details are logged, never sent to the caller.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound => (StatusCode::NOT_FOUND, String::from("not found")),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                String::from("method not allowed"),
            ),
            AppError::Internal(e) => {
                error!("internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal server error"),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::EmptyUrl => AppError::BadRequest(LinkError::EmptyUrl.to_string()),
            LinkError::UnknownCode => AppError::NotFound,
            LinkError::Db(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("invalid request body: {err}"))
    }
}

pub fn routes(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(handle_health))
        .route("/shorten", post(handle_shorten))
        .route("/stats/{code}", get(handle_stats))
        .route("/stats/{code}/clicks", get(handle_daily_clicks))
        .route("/get-link/{code}", get(handle_resolve))
        .route("/link/{code}", get(handle_resolve))
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_method_not_allowed)
        .with_state(app)
}

async fn handle_not_found() -> AppError {
    AppError::NotFound
}

async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

pub async fn handle_shorten(
    State(app): State<Arc<App>>,
    body: Bytes,
) -> Result<Json<ShortenResponse>, AppError> {
    // the body is JSON whatever the content-type header claims
    let request: ShortenRequest = serde_json::from_slice(&body)?;

    info!("handle_shorten: '{}'", request.url);

    let short_url = app.shorten(&request.url).await?;

    Ok(Json(ShortenResponse { short_url }))
}

pub async fn handle_stats(
    Path(code): Path<String>,
    State(app): State<Arc<App>>,
) -> Result<Json<LinkStats>, AppError> {
    info!("handle_stats: {}", code);

    Ok(Json(app.stats(&code).await?.into()))
}

pub async fn handle_daily_clicks(
    Path(code): Path<String>,
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<DailyClicks>>, AppError> {
    info!("handle_daily_clicks: {}", code);

    let records = app.daily_clicks(&code).await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn handle_resolve(
    Path(code): Path<String>,
    State(app): State<Arc<App>>,
) -> Result<Json<ResolvedLinkResponse>, AppError> {
    info!("handle_resolve: {}", code);

    let url = app.resolve(&code).await?;

    Ok(Json(ResolvedLinkResponse { url }))
}
