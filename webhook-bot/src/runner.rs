//! Startup sequence and server loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dbot_core::{init_tracing, StateStorage};
use dbot_telegram::{
    bot_id_from_token, compute_webhook_url, register_webhook, webhook_router, AppContext,
    TelegramBotAdapter, WebhookApi, WebhookSecret,
};
use handler_chain::Dispatcher;
use tracing::{error, info, instrument};

use crate::config::BotConfig;

/// Everything needed to serve: the HTTP router (webhook registered), the address to bind and
/// the state store to close on shutdown.
pub struct WebhookApp {
    pub router: axum::Router,
    pub webhook_url: String,
    pub listen_addr: SocketAddr,
    pub bot_username: Option<String>,
    pub storage: Arc<dyn StateStorage>,
}

/// Runs the startup sequence up to (not including) binding: state store, plugin discovery, bot,
/// secret, webhook registration, getMe. Any failure aborts; nothing is served.
#[instrument(skip(config))]
pub async fn build_app(config: &BotConfig) -> Result<WebhookApp> {
    config.validate()?;
    info!("Setting up bot");

    let storage = storage::open_state_storage(&config.state_store_url)
        .await
        .with_context(|| format!("Failed to open state store: {}", config.state_store_url))?;
    info!(state_store_url = %config.state_store_url, "step: state store opened");

    let mut dispatcher = Dispatcher::new(storage.clone())
        .with_bot_id(bot_id_from_token(&config.bot_token))
        .with_destiny(config.state_destiny.clone())
        .setup(
            &middleware::manifest(config.allowed_users.clone()),
            &handlers::manifest(),
        )
        .context("Plugin discovery failed")?;
    info!(
        middleware = dispatcher.middleware_count(),
        routers = dispatcher.router_count(),
        "step: plugins registered"
    );

    let adapter = TelegramBotAdapter::new(config.telegram().build_bot()?);
    let secret = WebhookSecret::generate();
    let webhook_url = compute_webhook_url(&config.base_url, &config.webhook_path);

    register_webhook(&adapter, &webhook_url, &secret)
        .await
        .context("Webhook registration failed")?;
    info!(path = %config.webhook_path, "Added route for webhook");
    info!(url = %webhook_url, "Webhook successfully set");

    let me = adapter.get_me().await.context("getMe failed")?;
    let bot_username = me.username.clone();
    dispatcher.set_bot_username(bot_username.clone());
    info!(
        username = %bot_username.as_deref().unwrap_or("unknown"),
        "Bot setup complete"
    );

    let ctx = AppContext::new(Arc::new(dispatcher), Arc::new(adapter), secret)
        .with_dispatch_timeout(config.dispatch_timeout());
    let router = webhook_router(Arc::new(ctx), &config.webhook_path);

    Ok(WebhookApp {
        router,
        webhook_url,
        listen_addr: config.listen_addr()?,
        bot_username,
        storage,
    })
}

/// Main entry: init logging, build the app, serve until ctrl-c, then close the state store.
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;

    let app = build_app(&config).await.map_err(|e| {
        error!(error = %e, "Startup failed");
        e
    })?;

    let listener = tokio::net::TcpListener::bind(app.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", app.listen_addr))?;
    info!(address = %app.listen_addr, "Server listening");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app.router)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    app.storage.close().await?;
    info!("Server shutdown complete");
    Ok(())
}
