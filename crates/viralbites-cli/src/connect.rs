//! `viralbites connect`: serves the OAuth routes locally and waits for the
//! callback, Ctrl-C, or the timeout, whichever comes first.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::Router;
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use viralbites_auth::{oauth_router, AuthError, ConnectResponse, ConnectSources, Connector, OAuthState};
use viralbites_core::{AppConfig, SocialPlatform};

pub(crate) fn start_url(public_url: &str, platform: SocialPlatform) -> String {
    format!("{}/auth/{}", public_url.trim_end_matches('/'), platform.slug())
}

pub(crate) fn describe(response: &ConnectResponse) -> Option<String> {
    if response.success {
        let token = response.token.as_deref().unwrap_or_default();
        Some(format!(
            "Connected {}. Access token: {token}",
            response.platform
        ))
    } else if response.is_cancelled() {
        None
    } else {
        Some(format!(
            "Could not connect {}: {}",
            response.platform,
            response.error.as_deref().unwrap_or("unknown error")
        ))
    }
}

/// How long in-flight callback responses get to finish after the flow resolves.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Serves `app` until `shutdown` fires, then lets in-flight responses finish.
pub(crate) fn serve_callbacks(
    listener: TcpListener,
    app: Router,
    shutdown: oneshot::Receiver<()>,
) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown.await.ok();
            })
            .await
    })
}

pub(crate) async fn run_connect(config: &AppConfig, platform: SocialPlatform) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(4);
    let oauth = OAuthState::from_config(config)?.with_relay(tx);
    if !oauth.is_configured(platform) {
        return Err(AuthError::NotConfigured(platform).into());
    }

    let app: Router = oauth_router(oauth);
    let listener = TcpListener::bind(config.bind_addr).await?;
    let (stop, stopped) = oneshot::channel();
    let server = serve_callbacks(listener, app, stopped);
    tracing::info!(addr = %config.bind_addr, %platform, "callback listener started");

    println!(
        "Open this URL in your browser to connect {platform}:\n  {}\nPress Ctrl-C to cancel.",
        start_url(&config.public_url, platform)
    );

    let cancelled = Arc::new(AtomicBool::new(false));
    let ctrl_c = tokio::spawn({
        let cancelled = Arc::clone(&cancelled);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancelled.store(true, Ordering::SeqCst);
            }
        }
    });

    let sources = ConnectSources::new(rx, Duration::from_secs(config.connect_timeout_secs))
        .with_closed_probe(move || cancelled.load(Ordering::SeqCst));
    let response = Connector::new().connect(platform, sources).await;

    ctrl_c.abort();
    let _ = stop.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(Ok(Err(e))) => tracing::warn!(error = %e, "callback listener failed"),
        Ok(Err(e)) => tracing::warn!(error = %e, "callback listener task failed"),
        Err(_) => tracing::warn!("callback listener did not stop in time"),
        Ok(Ok(Ok(()))) => {}
    }

    match describe(&response) {
        Some(line) if response.success => println!("{line}"),
        Some(line) => anyhow::bail!(line),
        None => {}
    }
    Ok(())
}
