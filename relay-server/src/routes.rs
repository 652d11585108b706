use std::{convert::Infallible, future::Future, net::SocketAddr, sync::Arc};

use relay_core::{Relay, Stored, health_check};
use warp::{Filter, Rejection, Reply, http::StatusCode};

/// `GET /` liveness text and `GET /clima` relay trigger.
pub fn routes(relay: Arc<Relay>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::get().and(warp::path::end()).map(health_check);

    let clima = warp::get()
        .and(warp::path("clima"))
        .and(warp::path::end())
        .and(with_relay(relay))
        .and_then(fetch_and_store);

    health.or(clima)
}

fn with_relay(relay: Arc<Relay>) -> impl Filter<Extract = (Arc<Relay>,), Error = Infallible> + Clone {
    warp::any().map(move || relay.clone())
}

async fn fetch_and_store(relay: Arc<Relay>) -> Result<impl Reply, Rejection> {
    let (body, status) = match relay.fetch_and_store().await {
        Ok(stored) => (serde_json::json!(stored), Stored::STATUS),
        Err(err) => (err.to_body(), err.status_code()),
    };
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

/// Every interface on `port`.
pub fn listen_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Serve until Ctrl-C.
pub async fn serve(relay: Arc<Relay>, addr: SocketAddr) -> anyhow::Result<()> {
    let (bound, server) = bind(relay, addr, shutdown_signal())?;

    tracing::info!("Server listening on port {}", bound.port());
    tracing::info!("Weather endpoint: http://localhost:{}/clima", bound.port());

    server.await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Bind the routes to `addr`; the returned future runs until `signal` resolves.
pub fn bind(
    relay: Arc<Relay>,
    addr: SocketAddr,
    signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<(SocketAddr, impl Future<Output = ()>)> {
    let routes = routes(relay).with(warp::trace::request());
    let (bound, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, signal)?;
    Ok((bound, server))
}

fn shutdown_signal() -> impl Future<Output = ()> {
    async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    }
}
