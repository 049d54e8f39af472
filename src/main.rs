use log::{error, info};
use tokio::net::TcpListener;

use pagewiki::logger::Logger;
use pagewiki::{build_router, AppState, Config, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    dotenv::dotenv().ok();
    if let Err(e) = Logger::init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let config = Config::from_env().inspect_err(|e| error!("{}", e))?;
    let addr = config.socket_addr();
    info!(
        "Serving pages from {:?} with templates from {:?}",
        config.data_dir, config.template_dir
    );

    let state = AppState::from_config(config)?;
    let app = build_router(state);

    info!("Wiki listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WikiError::from)?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown requested, finishing in-flight requests");
}
