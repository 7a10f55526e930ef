use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub tmdb_language: String,
    pub tmdb_rps: u32,
    pub http_timeout_secs: u64,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let tmdb_access_token = std::env::var("TMDB_ACCESS_TOKEN").unwrap_or_default();
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = std::env::var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|_| "https://image.tmdb.org".to_string());
        let tmdb_language =
            std::env::var("TMDB_LANGUAGE").unwrap_or_else(|_| "en-US".to_string());

        let tmdb_rps: u32 = match std::env::var("TMDB_RPS") {
            Ok(s) => s.parse().context("TMDB_RPS")?,
            Err(_) => 4,
        };

        let http_timeout_secs: u64 =
            std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(30);

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://manavie.db?mode=rwc".to_string());

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            tmdb_access_token,
            tmdb_base_url,
            tmdb_image_base_url,
            tmdb_language,
            tmdb_rps,
            http_timeout_secs,
            database_url,
        })
    }
}
