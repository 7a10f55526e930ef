use std::collections::HashSet;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    classify,
    error::{AppError, AppResult},
    models::{CreatedMovie, LinkReport, MovieDetails, NewMovie, Role, SyncCategory, SyncReport},
    normalize,
    resolver::{self, Candidate, EntityKind},
    store::{DEFAULT_STAGE, MovieStore},
    tmdb::{Catalog, MovieSummary},
};

/// Drives catalog fetches into the store.
///
/// Every step that writes holds `write_lock` for its whole duration, so two overlapping
/// requests cannot both decide to create the same partner.
pub struct Syncer<C> {
    store: MovieStore,
    catalog: C,
    write_lock: Mutex<()>,
}

impl<C: Catalog> Syncer<C> {
    pub fn new(store: MovieStore, catalog: C) -> Self {
        Self { store, catalog, write_lock: Mutex::new(()) }
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    pub async fn sync(&self, category: SyncCategory) -> AppResult<SyncReport> {
        let _guard = self.write_lock.lock().await;

        let summaries = match category {
            SyncCategory::TrendingMovies => self.catalog.trending_movies().await?,
        };

        let mut report = SyncReport { fetched: summaries.len(), ..Default::default() };
        let mut seen_titles = HashSet::new();
        let mut staged = Vec::new();

        for summary in summaries {
            if !seen_titles.insert(summary.title.clone())
                || self.store.find_by_title(&summary.title).await?.is_some()
                || self.store.find_by_external_id(summary.id).await?.is_some()
            {
                debug!(title = %summary.title, "already in store, skipping");
                report.skipped.push(summary.title);
                continue;
            }
            staged.push(summary);
        }

        let stage_id = self.store.stage_by_name(DEFAULT_STAGE).await?.map(|s| s.id);

        // Posters are downloaded before the insert so a CDN failure leaves nothing behind.
        let mut payloads = Vec::with_capacity(staged.len());
        for summary in staged {
            payloads.push(self.build_payload(summary, stage_id).await?);
        }

        let created = self.store.insert_movies(payloads).await?;
        report.created = created
            .into_iter()
            .map(|m| CreatedMovie { external_id: m.external_id, title: m.title })
            .collect();

        info!(
            fetched = report.fetched,
            created = report.created.len(),
            skipped = report.skipped.len(),
            "synced trending movies"
        );
        Ok(report)
    }

    async fn build_payload(
        &self,
        summary: MovieSummary,
        stage_id: Option<i32>,
    ) -> AppResult<NewMovie> {
        let language_id =
            normalize::language_id(self.store.db(), summary.original_language.as_deref()).await?;

        let poster = match summary.poster_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => Some(normalize::encode_poster(&self.catalog.poster(path).await?)),
            None => None,
        };

        Ok(NewMovie {
            external_id: summary.id,
            release_date: normalize::release_date(summary.release_date.as_deref())?,
            storyline: summary.overview.filter(|s| !s.is_empty()),
            title: summary.title,
            language_id,
            poster,
            stage_id,
        })
    }

    /// Genres, production companies and the scalar detail fields of one movie.
    pub async fn update_details(&self, external_id: i64) -> AppResult<LinkReport> {
        let _guard = self.write_lock.lock().await;
        let movie = self.store.get_by_external_id(external_id).await?;

        let detail = self.catalog.movie_detail(external_id).await?;
        if detail.id != external_id {
            warn!(
                external_id = external_id,
                returned = detail.id,
                "catalog returned another movie"
            );
        }

        let mut report = LinkReport::default();
        for g in &detail.genres {
            let (genre_id, created) = resolver::resolve_and_apply(
                self.store.db(),
                EntityKind::Genre,
                Candidate::with_id(&g.name, g.id),
            )
            .await?;
            if self.store.add_genre(movie.id, genre_id).await? {
                report.linked += 1;
            }
            if created {
                report.created += 1;
            }
        }

        for company in &detail.production_companies {
            let (partner_id, created) = resolver::resolve_and_apply(
                self.store.db(),
                EntityKind::Publisher,
                Candidate::with_id(&company.name, company.id),
            )
            .await?;
            if self.store.add_credit(movie.id, partner_id, Role::Publisher).await? {
                report.linked += 1;
            }
            if created {
                report.created += 1;
            }
        }

        let details = MovieDetails {
            runtime: detail.runtime.map(normalize::runtime_hours),
            adult: detail.adult,
            homepage: detail.homepage.filter(|h| !h.is_empty()),
            box_office: detail.revenue,
            rating: normalize::rating(detail.vote_average, detail.vote_count),
        };
        self.store.update_details(movie, &details).await?;

        info!(external_id = external_id, linked = report.linked, "updated movie details");
        Ok(report)
    }

    pub async fn update_cast(&self, external_id: i64) -> AppResult<LinkReport> {
        let _guard = self.write_lock.lock().await;
        let movie = self.store.get_by_external_id(external_id).await?;
        let credits = self.catalog.credits(external_id).await?;
        let report = classify::link_credits(&self.store, movie.id, &credits).await?;
        info!(external_id = external_id, linked = report.linked, "updated movie cast");
        Ok(report)
    }

    /// Cast first, then details.
    pub async fn refresh(&self, external_id: i64) -> AppResult<LinkReport> {
        let mut report = self.update_cast(external_id).await?;
        report.merge(self.update_details(external_id).await?);
        Ok(report)
    }

    /// Remote title search. Nothing is written.
    pub async fn discover(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("query is required".to_string()));
        }
        self.catalog.search_movies(query).await
    }

    /// Manually adds a named partner to any relationship of a movie.
    pub async fn link_credit(&self, external_id: i64, role: Role, name: &str) -> AppResult<i32> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let movie = self.store.get_by_external_id(external_id).await?;
        let kind = match role {
            Role::Publisher | Role::Distributor => EntityKind::Publisher,
            _ => EntityKind::Person,
        };
        let (partner_id, _) =
            resolver::resolve_and_apply(self.store.db(), kind, Candidate::named(name)).await?;
        self.store.add_credit(movie.id, partner_id, role).await?;
        Ok(partner_id)
    }

    /// The only way a relationship member is ever removed.
    pub async fn unlink_credit(
        &self,
        external_id: i64,
        role: Role,
        partner_id: i32,
    ) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let movie = self.store.get_by_external_id(external_id).await?;
        if !self.store.remove_credit(movie.id, partner_id, role).await? {
            return Err(AppError::NotFound(format!(
                "{} credit for partner {partner_id}",
                role.as_code()
            )));
        }
        Ok(())
    }

    pub async fn set_stage(&self, external_id: i64, stage: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let movie = self.store.get_by_external_id(external_id).await?;
        let stage = self
            .store
            .stage_by_name(stage)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("stage {stage:?}")))?;
        self.store.set_stage(movie, stage.id).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::tmdb::{CastMember, Credits, CrewMember, MovieDetail, NamedRef};

    /// Catalog served from memory. Endpoints without a canned answer fail like a 404.
    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub trending: Vec<MovieSummary>,
        pub details: HashMap<i64, MovieDetail>,
        pub credits: HashMap<i64, Credits>,
        pub posters_down: bool,
        pub poster_calls: AtomicUsize,
    }

    fn not_found(what: &str) -> AppError {
        AppError::connectivity(what, "HTTP 404 Not Found")
    }

    impl Catalog for FakeCatalog {
        async fn trending_movies(&self) -> AppResult<Vec<MovieSummary>> {
            Ok(self.trending.clone())
        }

        async fn movie_detail(&self, external_id: i64) -> AppResult<MovieDetail> {
            self.details.get(&external_id).cloned().ok_or_else(|| not_found("movie"))
        }

        async fn credits(&self, external_id: i64) -> AppResult<Credits> {
            self.credits.get(&external_id).cloned().ok_or_else(|| not_found("credits"))
        }

        async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
            Ok(self.trending.iter().filter(|m| m.title.contains(query)).cloned().collect())
        }

        async fn poster(&self, _poster_path: &str) -> AppResult<Vec<u8>> {
            self.poster_calls.fetch_add(1, Ordering::SeqCst);
            if self.posters_down {
                return Err(not_found("poster"));
            }
            Ok(b"poster".to_vec())
        }
    }

    pub(crate) fn summary(id: i64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            overview: Some(format!("About {title}")),
            release_date: Some("2024-03-01".to_string()),
            original_language: Some("en".to_string()),
            poster_path: Some(format!("/{id}.jpg")),
        }
    }

    fn detail(id: i64) -> MovieDetail {
        MovieDetail {
            id,
            genres: vec![
                NamedRef { id: 878, name: "Science Fiction".to_string() },
                NamedRef { id: 12, name: "Adventure".to_string() },
            ],
            production_companies: vec![NamedRef {
                id: 923,
                name: "Legendary Pictures".to_string(),
            }],
            runtime: Some(166),
            adult: false,
            homepage: Some("https://www.dunemovie.com".to_string()),
            revenue: 711_844_358.0,
            vote_average: 8.1,
            vote_count: 6000,
        }
    }

    fn one_director_one_actor() -> Credits {
        Credits {
            cast: vec![CastMember { id: 1190668, name: "Timothée Chalamet".to_string() }],
            crew: vec![CrewMember {
                id: 137427,
                name: "Denis Villeneuve".to_string(),
                department: Some("Directing".to_string()),
                known_for_department: Some("Directing".to_string()),
            }],
        }
    }

    async fn syncer(catalog: FakeCatalog) -> Syncer<FakeCatalog> {
        Syncer::new(MovieStore::new(crate::db::memory().await), catalog)
    }

    #[tokio::test]
    async fn sync_skips_titles_already_stored() {
        let catalog = FakeCatalog {
            trending: vec![summary(1, "Oppenheimer"), summary(693134, "Dune: Part Two")],
            details: HashMap::from([(693134, detail(693134))]),
            credits: HashMap::from([(693134, one_director_one_actor())]),
            ..Default::default()
        };
        let syncer = syncer(catalog).await;
        syncer
            .store()
            .insert_movies(vec![NewMovie {
                external_id: 872585,
                title: "Oppenheimer".to_string(),
                storyline: None,
                release_date: None,
                language_id: None,
                poster: None,
                stage_id: None,
            }])
            .await
            .unwrap();

        let report = syncer.sync(SyncCategory::TrendingMovies).await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.skipped, ["Oppenheimer"]);
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].external_id, 693134);
        assert_eq!(syncer.catalog.poster_calls.load(Ordering::SeqCst), 1);

        let created = syncer.store().get_by_external_id(693134).await.unwrap();
        assert_eq!(created.title, "Dune: Part Two");
        assert_eq!(created.release_date.as_deref(), Some("2024-03-01"));
        assert_eq!(created.poster.as_deref(), Some("cG9zdGVy"));
        assert!(created.language_id.is_some());
        let view = syncer.store().movie_view(693134).await.unwrap();
        assert_eq!(view.stage.as_deref(), Some("New"));
        assert_eq!(view.language.as_deref(), Some("English"));

        // Enrichment of the new movie.
        let cast = syncer.update_cast(693134).await.unwrap();
        assert_eq!(cast.linked, 2);
        let directors = syncer.store().credits_for(created.id, Role::Director).await.unwrap();
        let actors = syncer.store().credits_for(created.id, Role::Cast).await.unwrap();
        assert_eq!(directors.len(), 1);
        assert_eq!(directors[0].name, "Denis Villeneuve");
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].name, "Timothée Chalamet");
        for role in [Role::Producer, Role::Writer, Role::Editor, Role::Music] {
            assert!(syncer.store().credits_for(created.id, role).await.unwrap().is_empty());
        }

        syncer.update_details(693134).await.unwrap();
        let view = syncer.store().movie_view(693134).await.unwrap();
        assert_eq!(view.runtime, Some(1.66));
        assert_eq!(view.genres, ["Adventure", "Science Fiction"]);
        assert_eq!(view.credits[&Role::Publisher][0].name, "Legendary Pictures");
        assert_eq!(view.box_office, Some(711_844_358.0));
        assert_eq!(view.rating, "Excellent");
        assert_eq!(view.homepage.as_deref(), Some("https://www.dunemovie.com"));
    }

    #[tokio::test]
    async fn second_sync_creates_nothing() {
        let catalog = FakeCatalog {
            trending: vec![
                summary(1, "Civil War"),
                summary(2, "Challengers"),
                summary(3, "Civil War"),
            ],
            ..Default::default()
        };
        let syncer = syncer(catalog).await;

        let first = syncer.sync(SyncCategory::TrendingMovies).await.unwrap();
        assert_eq!(first.created.len(), 2);
        assert_eq!(first.skipped, ["Civil War"]);

        let second = syncer.sync(SyncCategory::TrendingMovies).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), 3);
        assert_eq!(syncer.store().search_titles("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn poster_failure_persists_no_movie() {
        let catalog = FakeCatalog {
            trending: vec![summary(1, "Alien: Romulus"), summary(2, "Longlegs")],
            posters_down: true,
            ..Default::default()
        };
        let syncer = syncer(catalog).await;

        let err = syncer.sync(SyncCategory::TrendingMovies).await.unwrap_err();
        assert!(matches!(err, AppError::Connectivity { .. }));
        assert!(syncer.store().search_titles("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_poster_path_stores_no_poster() {
        let mut no_poster = summary(5, "Late Night with the Devil");
        no_poster.poster_path = None;
        no_poster.original_language = Some("xx".to_string());
        let syncer = syncer(FakeCatalog { trending: vec![no_poster], ..Default::default() }).await;

        syncer.sync(SyncCategory::TrendingMovies).await.unwrap();
        let movie = syncer.store().get_by_external_id(5).await.unwrap();
        assert!(movie.poster.is_none());
        assert!(movie.language_id.is_none());
        assert_eq!(syncer.catalog.poster_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_detail_fetch_writes_nothing() {
        let syncer =
            syncer(FakeCatalog { trending: vec![summary(9, "Furiosa")], ..Default::default() })
                .await;
        syncer.sync(SyncCategory::TrendingMovies).await.unwrap();

        let err = syncer.update_details(9).await.unwrap_err();
        assert!(matches!(err, AppError::Connectivity { .. }));
        let err = syncer.update_cast(9).await.unwrap_err();
        assert!(matches!(err, AppError::Connectivity { .. }));

        let view = syncer.store().movie_view(9).await.unwrap();
        assert!(view.runtime.is_none());
        assert!(view.genres.is_empty());
        assert!(view.credits.is_empty());
    }

    #[tokio::test]
    async fn enrichment_is_additive() {
        let catalog = FakeCatalog {
            trending: vec![summary(693134, "Dune: Part Two")],
            details: HashMap::from([(693134, detail(693134))]),
            credits: HashMap::from([(693134, one_director_one_actor())]),
            ..Default::default()
        };
        let syncer = syncer(catalog).await;
        syncer.sync(SyncCategory::TrendingMovies).await.unwrap();

        let extra = syncer.link_credit(693134, Role::Cast, "Zendaya").await.unwrap();
        let first = syncer.refresh(693134).await.unwrap();
        assert_eq!(first.linked, 2 + 3);
        let second = syncer.refresh(693134).await.unwrap();
        assert_eq!(second, LinkReport::default());

        let movie = syncer.store().get_by_external_id(693134).await.unwrap();
        let cast = syncer.store().credits_for(movie.id, Role::Cast).await.unwrap();
        assert_eq!(cast.len(), 2);
        assert!(cast.iter().any(|p| p.id == extra));
    }

    #[tokio::test]
    async fn enrichment_of_unknown_movie_is_not_found() {
        let syncer = syncer(FakeCatalog::default()).await;
        assert!(matches!(syncer.update_cast(42).await, Err(AppError::NotFound(_))));
        assert!(matches!(syncer.update_details(42).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn discover_does_not_persist() {
        let syncer =
            syncer(FakeCatalog { trending: vec![summary(1, "Wicked")], ..Default::default() })
                .await;

        let found = syncer.discover("Wick").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(syncer.store().search_titles("Wicked").await.unwrap().is_empty());
        assert!(matches!(syncer.discover("  ").await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn manual_links_and_reconciliation() {
        let syncer =
            syncer(FakeCatalog { trending: vec![summary(1, "Anora")], ..Default::default() })
                .await;
        syncer.sync(SyncCategory::TrendingMovies).await.unwrap();

        let neon = syncer.link_credit(1, Role::Distributor, "Neon").await.unwrap();
        let again = syncer.link_credit(1, Role::Distributor, "Neon").await.unwrap();
        assert_eq!(neon, again);

        syncer.unlink_credit(1, Role::Distributor, neon).await.unwrap();
        assert!(matches!(
            syncer.unlink_credit(1, Role::Distributor, neon).await,
            Err(AppError::NotFound(_))
        ));

        syncer.set_stage(1, "Reviewed").await.unwrap();
        assert_eq!(syncer.store().movie_view(1).await.unwrap().stage.as_deref(), Some("Reviewed"));
        assert!(matches!(syncer.set_stage(1, "Archived").await, Err(AppError::NotFound(_))));
    }
}
