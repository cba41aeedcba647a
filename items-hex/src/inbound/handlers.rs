//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State, rejection::FormRejection},
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use items_types::{
    AppError, ErrorResponse, Item, ItemId, ItemParams, ItemRepository, MessageResponse,
    Principal, TokenRequest, TokenResponse,
};

use crate::{AuthGate, ItemScope, ItemService};

/// Application state shared across handlers.
pub struct AppState<R: ItemRepository> {
    pub service: ItemService<R>,
    pub auth: AuthGate,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            AppError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "Invalid credentials".to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let mut response = (status, Json(ErrorResponse { detail })).into_response();

        match &self.0 {
            AppError::Unauthorized(_) => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer"),
                );
            }
            AppError::RateLimited => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("60"));
            }
            _ => {}
        }

        response
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractors
// ─────────────────────────────────────────────────────────────────────────────

/// Store scope acquired for the duration of one handler call.
///
/// Dropping the extractor (on success, error, or cancellation) releases the
/// underlying connection.
pub struct Store<R: ItemRepository>(pub ItemScope<R::Session>);

impl<R: ItemRepository> FromRequestParts<Arc<AppState<R>>> for Store<R> {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState<R>>,
    ) -> Result<Self, Self::Rejection> {
        let scope = state.service.scope().await?;
        Ok(Store(scope))
    }
}

/// Item fields taken from the query string, falling back to a JSON body.
#[derive(Debug)]
pub struct ItemInput(pub ItemParams);

impl<S: Send + Sync> FromRequest<S> for ItemInput {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query_err = match Query::<ItemParams>::try_from_uri(req.uri()) {
            Ok(Query(params)) => return Ok(ItemInput(params)),
            Err(e) => e,
        };

        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if !is_json {
            return Err(AppError::Unprocessable(query_err.body_text()).into());
        }

        let Json(params) = Json::<ItemParams>::from_request(req, state)
            .await
            .map_err(|e| AppError::Unprocessable(e.body_text()))?;

        Ok(ItemInput(params))
    }
}

fn parse_item_id(raw: &str) -> Result<ItemId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Unprocessable("Invalid item id".into()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Public endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;

    Json(crate::openapi::ApiDoc::openapi())
}

/// Exchange the username/password form for a bearer token.
#[tracing::instrument(skip_all)]
pub async fn login<R: ItemRepository>(
    State(state): State<Arc<AppState<R>>>,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Form(req) = form.map_err(|e| AppError::Unprocessable(e.body_text()))?;

    let token = state
        .auth
        .issue_token(&req.username, &req.password)
        .inspect_err(|_| tracing::info!(username = %req.username, "login rejected"))?;

    Ok(Json(token))
}

// ─────────────────────────────────────────────────────────────────────────────
// Items (authenticated)
// ─────────────────────────────────────────────────────────────────────────────

/// Create an item.
///
/// The store scope is opened only once the request body has been read.
#[tracing::instrument(skip(state), fields(subject = %principal.subject))]
pub async fn create_item<R: ItemRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(principal): Extension<Principal>,
    ItemInput(params): ItemInput,
) -> Result<Json<Item>, ApiError> {
    let mut store = state.service.scope().await?;
    let item = store.create(params).await?;
    Ok(Json(item))
}

/// List all items.
#[tracing::instrument(skip(store), fields(subject = %principal.subject))]
pub async fn list_items<R: ItemRepository>(
    Extension(principal): Extension<Principal>,
    Store(mut store): Store<R>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = store.list().await?;
    Ok(Json(items))
}

/// Get item by ID.
#[tracing::instrument(skip(store), fields(subject = %principal.subject))]
pub async fn get_item<R: ItemRepository>(
    Extension(principal): Extension<Principal>,
    Path(item_id): Path<String>,
    Store(mut store): Store<R>,
) -> Result<Json<Item>, ApiError> {
    let id = parse_item_id(&item_id)?;
    let item = store.get(id).await?;
    Ok(Json(item))
}

/// Replace an item's name and description.
///
/// The id is validated before the fields, and the store scope is opened last.
#[tracing::instrument(skip(state, input), fields(subject = %principal.subject))]
pub async fn update_item<R: ItemRepository>(
    State(state): State<Arc<AppState<R>>>,
    Extension(principal): Extension<Principal>,
    Path(item_id): Path<String>,
    input: Result<ItemInput, ApiError>,
) -> Result<Json<Item>, ApiError> {
    let id = parse_item_id(&item_id)?;
    let ItemInput(params) = input?;
    let mut store = state.service.scope().await?;
    let item = store.update(id, params).await?;
    Ok(Json(item))
}

/// Delete an item.
#[tracing::instrument(skip(store), fields(subject = %principal.subject))]
pub async fn delete_item<R: ItemRepository>(
    Extension(principal): Extension<Principal>,
    Path(item_id): Path<String>,
    Store(mut store): Store<R>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_item_id(&item_id)?;
    let message = store.delete(id).await?;
    Ok(Json(message))
}
