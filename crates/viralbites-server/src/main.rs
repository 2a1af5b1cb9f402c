mod api;
mod middleware;

use std::sync::Arc;

use axum::http::HeaderValue;
use tracing_subscriber::EnvFilter;
use viralbites_auth::OAuthState;
use viralbites_pipeline::SearchPipeline;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = viralbites_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pipeline = match SearchPipeline::from_config(&config) {
        Ok(pipeline) => Some(Arc::new(pipeline)),
        Err(e) => {
            tracing::warn!(error = %e, "search API disabled");
            None
        }
    };

    let oauth = OAuthState::from_config(&config)?;
    let auth = AuthState::from_env(config.is_development())?;
    let frontend_origin = HeaderValue::from_str(&config.frontend_origin)?;
    let app = build_app(
        AppState { pipeline },
        oauth,
        auth,
        default_rate_limit_state(),
        frontend_origin,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        "ViralBites backend listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
