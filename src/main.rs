use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use dotenv::dotenv;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::FmtSubscriber;

use crate::{
    common::app_state::AppState,
    config::config::CONFIG,
    game::{cleanup::spawn_session_cleanup, handlers::game_routes},
    health::handlers::health_routes,
    mw::{auth_mw::auth_mw, request_mw::request_mw},
    pack::handlers::pack_routes,
    rating::handlers::rating_routes,
};

mod auth;
mod common;
mod config;
mod game;
mod health;
mod mw;
mod pack;
mod rating;
mod system_log;

#[cfg(test)]
mod tests;

fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .nest("/health", health_routes(state.clone()))
        .merge(pack_routes(state.clone()));

    let protected_routes = Router::new()
        .merge(game_routes(state.clone()))
        .merge(rating_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), auth_mw));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(from_fn(request_mw))
}

#[tokio::main]
async fn main() {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    let level = CONFIG
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::DEBUG);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global tracing");

    // Initialize state
    let state = AppState::from_connection_string(&CONFIG.database.url)
        .await
        .unwrap_or_else(|e| panic!("{}", e));

    if let Some(ttl_minutes) = CONFIG.game.session_ttl_minutes {
        info!("Stale session cleanup enabled, ttl {} minutes", ttl_minutes);
        spawn_session_cleanup(state.clone(), ttl_minutes, CONFIG.game.cleanup_interval_secs);
    }

    let app = build_router(state);

    // Initialize webserver
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", CONFIG.server.address, CONFIG.server.port))
            .await
            .unwrap();

    info!(
        "Server listening on address: {}",
        listener.local_addr().unwrap()
    );
    axum::serve(listener, app).await.unwrap();
}
