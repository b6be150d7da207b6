use std::sync::Arc;

use framecast::{
    common::{
        AnyResult,
        banner::{BannerInfo, print_banner},
        logger,
    },
    configs::Config,
    playout::PlayoutEngine,
    server::AppState,
    transport,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(config.logging.as_ref());

    print_banner(
        &BannerInfo::default(),
        &config.playout.catalog_path.display().to_string(),
        config.playout.frame_count.get(),
    );

    let engine = PlayoutEngine::from_config(config.playout.clone());
    let playout = engine.spawn()?;
    let state = Arc::new(AppState::new(engine.clone(), &config));

    let host = config.server.host.as_str();
    let http_listener = tokio::net::TcpListener::bind((host, config.server.http_port)).await?;
    let ws_listener = tokio::net::TcpListener::bind((host, config.server.ws_port)).await?;
    info!("HTTP listening on {}", http_listener.local_addr()?);
    info!("Live stream listening on {}", ws_listener.local_addr()?);

    let shutdown = CancellationToken::new();

    let http = {
        let token = shutdown.clone();
        let app = transport::http_server::router(state.clone());
        tokio::spawn(async move {
            axum::serve(http_listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
        })
    };
    let ws = {
        let token = shutdown.clone();
        let app = transport::websocket_server::router(state.clone());
        tokio::spawn(async move {
            axum::serve(ws_listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
        })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    // Closes the live connection first so the ws server can drain.
    engine.disable();
    shutdown.cancel();

    for (name, server) in [("http", http), ("ws", ws)] {
        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("{} server failed: {}", name, e),
            Err(e) => error!("{} server task panicked: {}", name, e),
        }
    }

    if tokio::task::spawn_blocking(move || playout.join()).await?.is_err() {
        error!("Playout thread panicked");
    }

    info!("Stopped");
    Ok(())
}
