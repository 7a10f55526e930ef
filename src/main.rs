mod classify;
mod config;
mod db;
mod entities;
mod error;
mod models;
mod normalize;
mod resolver;
mod routes;
mod store;
mod sync;
mod tmdb;

use std::{sync::Arc, time::Duration};

use crate::{config::Config, store::MovieStore, sync::Syncer, tmdb::TmdbClient};

pub struct AppState<C> {
    pub syncer: Syncer<C>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,manavie=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = wreq::Client::builder()
        .user_agent("manavie/0.1")
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_access_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_image_base_url.clone(),
        config.tmdb_language.clone(),
        config.tmdb_rps,
    );

    let state = Arc::new(AppState { syncer: Syncer::new(MovieStore::new(db), tmdb) });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
