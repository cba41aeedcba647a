//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use items_types::{ErrorResponse, Item, ItemParams, MessageResponse, TokenRequest, TokenResponse};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
async fn health() {}

/// Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many token requests from this address", body = ErrorResponse)
    )
)]
async fn login() {}

/// Create an item (fields as query parameters or JSON body)
#[utoipa::path(
    post,
    path = "/items/",
    tag = "items",
    params(ItemParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item created", body = Item),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Missing name or description", body = ErrorResponse)
    )
)]
async fn create_item() {}

/// List all items
#[utoipa::path(
    get,
    path = "/items/",
    tag = "items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All stored items", body = Vec<Item>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
async fn list_items() {}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/items/{item_id}",
    tag = "items",
    params(("item_id" = i64, Path, description = "Item ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
async fn get_item() {}

/// Replace an item's name and description
#[utoipa::path(
    put,
    path = "/items/{item_id}",
    tag = "items",
    params(
        ("item_id" = i64, Path, description = "Item ID"),
        ItemParams
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
async fn update_item() {}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/items/{item_id}",
    tag = "items",
    params(("item_id" = i64, Path, description = "Item ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
async fn delete_item() {}

/// OpenAPI documentation for the Items API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Items Service API",
        version = "1.0.0",
        description = "CRUD over a single item resource.\n\n## Authentication\n\nPost `username` and `password` as a form to `/token`, then send the returned token on every `/items` request:\n\n```\nAuthorization: Bearer secret-token\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        login,
        create_item,
        list_items,
        get_item,
        update_item,
        delete_item,
    ),
    components(
        schemas(
            Item,
            ItemParams,
            MessageResponse,
            TokenRequest,
            TokenResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Token issuance"),
        (name = "items", description = "Item management operations"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
