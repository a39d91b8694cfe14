//! HTTP surface: the webhook route Telegram posts updates to, and `/ping`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dbot_core::Bot;
use handler_chain::Dispatcher;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use crate::adapters::parse_update;
use crate::secret::{WebhookSecret, SECRET_HEADER};

/// Application context shared with every request.
pub struct AppContext {
    pub dispatcher: Arc<Dispatcher>,
    pub bot: Arc<dyn Bot>,
    pub secret: WebhookSecret,
    /// Upper bound for one dispatch; `None` lets dispatch run to completion.
    pub dispatch_timeout: Option<Duration>,
}

impl AppContext {
    pub fn new(dispatcher: Arc<Dispatcher>, bot: Arc<dyn Bot>, secret: WebhookSecret) -> Self {
        Self {
            dispatcher,
            bot,
            secret,
            dispatch_timeout: None,
        }
    }

    pub fn with_dispatch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.dispatch_timeout = timeout;
        self
    }
}

/// `POST {path}` for updates and `GET /ping`.
pub fn webhook_router(ctx: Arc<AppContext>, path: &str) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    Router::new()
        .route(&path, post(telegram_webhook_route))
        .route("/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "pong": true }))
}

#[instrument(skip_all)]
async fn telegram_webhook_route(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let candidate = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !ctx.secret.verify(candidate) {
        warn!(header_present = candidate.is_some(), "Wrong secret token on webhook request");
        return (
            StatusCode::OK,
            Json(json!({ "status": "error", "message": "Wrong secret token !" })),
        )
            .into_response();
    }

    let update = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Webhook body is not JSON");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    debug!(update_id = update.id, event = %update.event_type(), "step: update received");
    feed_webhook_update(&ctx, update).await;
    StatusCode::OK.into_response()
}

async fn feed_webhook_update(ctx: &AppContext, update: dbot_core::Update) {
    let update_id = update.id;
    let dispatch = ctx.dispatcher.feed_update(update, ctx.bot.clone());
    let outcome = match ctx.dispatch_timeout {
        Some(limit) => match tokio::time::timeout(limit, dispatch).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(update_id = update_id, timeout_ms = limit.as_millis() as u64, "Dispatch timed out, update dropped");
                return;
            }
        },
        None => dispatch.await,
    };
    if let Some(outcome) = outcome {
        info!(update_id = update_id, outcome = ?outcome, "step: update dispatched");
    }
}
