use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    clients::health::HealthChecker,
    config::Config,
    dispatcher::Dispatcher,
    error::DispatchError,
    models::{
        health::HealthStatus,
        message::{ChatNotificationRequest, NotificationRequest},
        notification::Notification,
        response::ApiResponse,
    },
};

/// Header carrying the authenticated caller, set by the gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub health_checker: HealthChecker,
}

pub enum ApiError {
    Unauthorized(String),
    Dispatch(DispatchError),
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        ApiError::Dispatch(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::Dispatch(e) => {
                let status = match &e {
                    DispatchError::MissingPreference { .. }
                    | DispatchError::MissingContact { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    DispatchError::UserNotFound(_) => StatusCode::NOT_FOUND,
                    DispatchError::Transport { .. } | DispatchError::ChatMirror(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    DispatchError::PushInit(_)
                    | DispatchError::Persistence(_)
                    | DispatchError::Render(_)
                    | DispatchError::UserLookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        };

        warn!(status = %status, error = %error, "Request failed");

        (
            status,
            Json(ApiResponse::<()>::error(error, "Notification dispatch failed")),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/notifications", post(create_notification))
        .route("/api/notifications/chat", post(send_chat_notification))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: &Config, state: Arc<AppState>) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification API server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn caller_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid caller identity".to_string()))
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn send_chat_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatNotificationRequest>,
) -> Result<Json<bool>, ApiError> {
    let sender_id = caller_id(&headers)?;

    state
        .dispatcher
        .send_chat_notification(sender_id, request.recipient_id, request.chat_room_id)
        .await?;

    Ok(Json(true))
}

async fn create_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    let notification = state
        .dispatcher
        .dispatch_between(request.sender_id, request.recipient_id, request.notification)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(notification, "Notification dispatched")),
    ))
}
