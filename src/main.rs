#![warn(clippy::pedantic, clippy::all, clippy::nursery)]

use rollcall::{
    app::build_router, config::RuntimeConfiguration, session_store::SqliteSessionStore,
    state::RollcallState,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

async fn shutdown_signal(state: RollcallState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

#[tokio::main]
async fn main() {
    //a missing .env is fine, everything has a default
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv {
        debug!(?e, "No .env loaded");
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = RollcallState::new(SqlitePoolOptions::new(), config.clone())
        .await
        .expect("unable to create state");

    tokio::spawn(
        SqliteSessionStore::new((*state).clone()).delete_expired_every(Duration::from_secs(60)),
    );

    let app = build_router(state.clone());

    let server_ip = config.server_config().server_ip.clone();
    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
