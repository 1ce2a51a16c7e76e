use axum::{
    body::Body,
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        OriginalUri, Path, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::dto::auto_dto::{AutoDto, AutoUpdateDto};
use crate::dto::page_dto::{CountResponse, PageResponse};
use crate::middleware::auth::{AuthenticatedUser, ROLE_ADMIN, ROLE_USER};
use crate::services::auto_write_service::{is_allowed_mimetype, UpdateParams};
use crate::services::pagination::Pageable;
use crate::services::query_builder::SearchParams;
use crate::state::AppState;
use crate::utils::errors::AppError;

const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_auto_router(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(find_autos))
        .route("/", post(create_auto))
        .route("/file/:id", get(get_file))
        .route("/:id", get(get_auto))
        .route("/:id", put(update_auto))
        .route("/:id", delete(delete_auto))
        .route(
            "/:id",
            post(add_file).layer(DefaultBodyLimit::max(max_file_size + MULTIPART_OVERHEAD)),
        )
}

fn etag(version: i32) -> String {
    format!("\"{}\"", version)
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("Invalid header value: {}", e)))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn find_autos(
    State(state): State<AppState>,
    Query(mut params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let only = params.remove("only");
    let page = params.remove("page");
    let size = params.remove("size");

    if only.as_deref() == Some("count") {
        let count = state.read_service.count().await?;
        return Ok(Json(CountResponse { count }).into_response());
    }

    let pageable = Pageable::from_params(page.as_deref(), size.as_deref());
    let search = if params.is_empty() { None } else { Some(&params) };
    let slice = state.read_service.find(search, pageable).await?;

    Ok(Json(PageResponse::from_slice(slice, &pageable)).into_response())
}

async fn get_auto(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let auto = state.read_service.find_by_id(id, true).await?;
    let current = etag(auto.version);

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if if_none_match == Some(current.as_str()) {
        tracing::debug!(id, etag = %current, "Nicht geaendert");
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        StatusCode::OK,
        [(header::ETAG, header_value(&current)?)],
        Json(auto),
    )
        .into_response())
}

async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let file = state.read_service.find_file_by_auto_id(id).await?;
    let disposition = format!("inline; filename=\"{}\"", file.filename.replace('"', ""));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, header_value(&file.mimetype)?),
            (header::CONTENT_DISPOSITION, header_value(&disposition)?),
        ],
        Body::from(file.data),
    )
        .into_response())
}

async fn create_auto(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Result<Json<AutoDto>, JsonRejection>,
) -> Result<Response, AppError> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_USER])?;
    let dto = json_body(body)?;
    dto.validate()?;

    let id = state.write_service.create(dto.into()).await?;

    let base = match &state.config.public_base_url {
        Some(base) => base.trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| state.config.server_url());
            format!("http://{}", host)
        }
    };
    let location = format!("{}{}/{}", base, uri.path().trim_end_matches('/'), id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, header_value(&location)?)],
    )
        .into_response())
}

fn multipart_error(error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(error.body_text())
    } else {
        AppError::BadRequest(error.body_text())
    }
}

async fn add_file(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_USER])?;
    let max_file_size = state.config.max_file_size;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_mimetype(&content_type) {
            return Err(AppError::UnsupportedMediaType(content_type));
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        if data.len() > max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "{} bytes > {} bytes",
                data.len(),
                max_file_size
            )));
        }

        state
            .write_service
            .add_file(id, data.to_vec(), filename)
            .await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Err(AppError::BadRequest("Keine Datei in der Anfrage".to_string()))
}

async fn update_auto(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    headers: HeaderMap,
    body: Result<Json<AutoUpdateDto>, JsonRejection>,
) -> Result<Response, AppError> {
    user.require_any_role(&[ROLE_ADMIN, ROLE_USER])?;

    let version = headers
        .get(header::IF_MATCH)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::PreconditionRequired)?
        .to_string();

    let dto = json_body(body)?;
    dto.validate()?;

    let new_version = state
        .write_service
        .update(UpdateParams {
            id,
            auto: dto.into(),
            version: &version,
        })
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::ETAG, header_value(&etag(new_version))?)],
    )
        .into_response())
}

async fn delete_auto(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    user.require_any_role(&[ROLE_ADMIN])?;
    state.write_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
