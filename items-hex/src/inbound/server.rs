//! HTTP Server configuration and startup.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use items_types::{ErrorResponse, ItemRepository};

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{SlidingWindowLimiter, rate_limit_middleware};
use crate::{AuthGate, ItemService};

/// Origin allowed by the cross-origin policy unless configured otherwise.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// HTTP Server for the Items API.
pub struct HttpServer<R: ItemRepository> {
    state: Arc<AppState<R>>,
    rate_limiter: Arc<SlidingWindowLimiter>,
    allowed_origin: HeaderValue,
}

impl<R: ItemRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service and auth gate.
    pub fn new(service: ItemService<R>, auth: AuthGate) -> Self {
        Self {
            state: Arc::new(AppState { service, auth }),
            rate_limiter: Arc::new(SlidingWindowLimiter::new()),
            allowed_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
        }
    }

    /// Replaces the single origin permitted by the CORS policy.
    pub fn with_allowed_origin(mut self, origin: &str) -> anyhow::Result<Self> {
        self.allowed_origin = HeaderValue::from_str(origin)
            .map_err(|e| anyhow::anyhow!("invalid CORS origin {:?}: {}", origin, e))?;
        Ok(self)
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let items = Router::new()
            .route(
                "/items",
                get(handlers::list_items::<R>).post(handlers::create_item::<R>),
            )
            .route(
                "/items/",
                get(handlers::list_items::<R>).post(handlers::create_item::<R>),
            )
            .route(
                "/items/{item_id}",
                get(handlers::get_item::<R>)
                    .put(handlers::update_item::<R>)
                    .delete(handlers::delete_item::<R>),
            )
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R>,
            ));

        let token = Router::new()
            .route("/token", post(handlers::login::<R>))
            .route_layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/openapi.json", get(handlers::openapi_json))
            .merge(token)
            .merge(items)
            .layer(cors_layer(self.allowed_origin.clone()))
            .layer(middleware::from_fn_with_state(
                self.allowed_origin.clone(),
                reject_foreign_preflight,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener until a shutdown signal arrives.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

/// Single allowed origin, credentials allowed, any method and header
/// mirrored back for that origin.
fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Answers a preflight from any origin other than the allowed one with 400
/// before the CORS layer can attach its headers.
async fn reject_foreign_preflight(
    State(allowed): State<HeaderValue>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let is_preflight = request.method() == Method::OPTIONS
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
    let foreign = headers
        .get(header::ORIGIN)
        .is_some_and(|origin| *origin != allowed);

    if is_preflight && foreign {
        tracing::debug!("preflight from disallowed origin rejected");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                detail: "Disallowed CORS origin".into(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
