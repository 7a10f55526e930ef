use std::{future::Future, num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    normalize,
};

/// Read-only view of the remote movie catalog.
pub trait Catalog: Send + Sync {
    fn trending_movies(&self) -> impl Future<Output = AppResult<Vec<MovieSummary>>> + Send;

    fn movie_detail(&self, external_id: i64) -> impl Future<Output = AppResult<MovieDetail>> + Send;

    fn credits(&self, external_id: i64) -> impl Future<Output = AppResult<Credits>> + Send;

    fn search_movies(&self, query: &str)
    -> impl Future<Output = AppResult<Vec<MovieSummary>>> + Send;

    /// Raw bytes of the w500 rendition of a poster.
    fn poster(&self, poster_path: &str) -> impl Future<Output = AppResult<Vec<u8>>> + Send;
}

pub struct TmdbClient {
    client: wreq::Client,
    access_token: String,
    base_url: String,
    image_base_url: String,
    language: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: wreq::Client,
        access_token: String,
        base_url: String,
        image_base_url: String,
        language: String,
        rps: u32,
    ) -> Self {
        if access_token.trim().is_empty() {
            tracing::warn!("no TMDB_ACCESS_TOKEN provided, catalog calls will be rejected");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, access_token, base_url, image_base_url, language, limiter }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_bytes(
        &self,
        url: &str,
        query: &[(&str, &str)],
        authorized: bool,
    ) -> AppResult<Vec<u8>> {
        self.limiter.until_ready().await;

        let mut req = self.client.get(url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if authorized {
            req = req.bearer_auth(&self.access_token);
        }

        let resp = req.send().await.map_err(|e| AppError::connectivity(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::connectivity(url, format!("HTTP {status}")));
        }

        let body = resp.bytes().await.map_err(|e| AppError::connectivity(url, e))?;
        Ok(body.to_vec())
    }

    /// Authorized GET with the configured language appended to `query`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = self.api_url(path);
        let mut params = vec![("language", self.language.as_str())];
        params.extend_from_slice(query);

        let body = self.get_bytes(&url, &params, true).await?;
        decode(&url, &body)
    }
}

impl Catalog for TmdbClient {
    async fn trending_movies(&self) -> AppResult<Vec<MovieSummary>> {
        debug!("fetching trending movies");
        let page: ResultsPage = self.get_json("/trending/movie/day", &[]).await?;
        Ok(page.results)
    }

    async fn movie_detail(&self, external_id: i64) -> AppResult<MovieDetail> {
        debug!(external_id = external_id, "fetching movie detail");
        self.get_json(&format!("/movie/{external_id}"), &[]).await
    }

    async fn credits(&self, external_id: i64) -> AppResult<Credits> {
        debug!(external_id = external_id, "fetching movie credits");
        self.get_json(&format!("/movie/{external_id}/credits"), &[]).await
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        debug!(query = %query, "searching catalog");
        let params = [("query", query), ("include_adult", "false"), ("page", "1")];
        let page: ResultsPage = self.get_json("/search/movie", &params).await?;
        Ok(page.results)
    }

    async fn poster(&self, poster_path: &str) -> AppResult<Vec<u8>> {
        let url = normalize::poster_url(&self.image_base_url, poster_path);
        debug!(url = %url, "downloading poster");
        self.get_bytes(&url, &[], false).await
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::MalformedResponse { from: url.to_string(), reason: e.to_string() })
}

#[derive(Debug, Deserialize)]
struct ResultsPage {
    results: Vec<MovieSummary>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub genres: Vec<NamedRef>,
    pub production_companies: Vec<NamedRef>,
    pub runtime: Option<u32>,
    pub adult: bool,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
}

/// An `{id, name}` pair as used for genres and production companies.
#[derive(Clone, Debug, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
}

impl CrewMember {
    pub fn department_label(&self) -> Option<&str> {
        self.known_for_department.as_deref().or(self.department.as_deref())
    }
}
