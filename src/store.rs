use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
    sea_query::{Expr, LikeExpr, OnConflict},
};

use crate::{
    entities::{genre, language, movie, movie_credit, movie_genre, partner, stage},
    error::{AppError, AppResult},
    models::{CreditView, MovieDetails, MovieListItem, MovieView, NewMovie, Rating, Role},
};

pub const DEFAULT_STAGE: &str = "New";

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn find_by_title(&self, title: &str) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find().filter(movie::Column::Title.eq(title)).one(&self.db).await?)
    }

    pub async fn find_by_external_id(&self, external_id: i64) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find()
            .filter(movie::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await?)
    }

    pub async fn get_by_external_id(&self, external_id: i64) -> AppResult<movie::Model> {
        self.find_by_external_id(external_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("movie {external_id}")))
    }

    /// Inserts the whole batch or nothing.
    pub async fn insert_movies(&self, movies: Vec<NewMovie>) -> AppResult<Vec<movie::Model>> {
        let now = now_sec();
        let txn = self.db.begin().await?;

        let mut created = Vec::with_capacity(movies.len());
        for m in movies {
            let model = movie::ActiveModel {
                id: Default::default(),
                external_id: Set(m.external_id),
                title: Set(m.title),
                storyline: Set(m.storyline),
                release_date: Set(m.release_date.map(|d| d.to_string())),
                poster: Set(m.poster),
                runtime: Set(None),
                rating: Set(Rating::NoRating.as_code()),
                box_office: Set(None),
                adult: Set(false),
                homepage: Set(None),
                language_id: Set(m.language_id),
                stage_id: Set(m.stage_id),
                created_at: Set(now),
                updated_at: Set(now),
            };
            created.push(model.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok(created)
    }

    pub async fn update_details(
        &self,
        movie: movie::Model,
        details: &MovieDetails,
    ) -> AppResult<movie::Model> {
        let mut active: movie::ActiveModel = movie.into();
        active.runtime = Set(details.runtime);
        active.adult = Set(details.adult);
        active.homepage = Set(details.homepage.clone());
        active.box_office = Set(Some(details.box_office));
        active.rating = Set(details.rating.as_code());
        active.updated_at = Set(now_sec());
        Ok(active.update(&self.db).await?)
    }

    pub async fn stage_by_name(&self, name: &str) -> AppResult<Option<stage::Model>> {
        Ok(stage::Entity::find().filter(stage::Column::Name.eq(name)).one(&self.db).await?)
    }

    pub async fn list_stages(&self) -> AppResult<Vec<stage::Model>> {
        Ok(stage::Entity::find().order_by_asc(stage::Column::Id).all(&self.db).await?)
    }

    pub async fn set_stage(&self, movie: movie::Model, stage_id: i32) -> AppResult<movie::Model> {
        let mut active: movie::ActiveModel = movie.into();
        active.stage_id = Set(Some(stage_id));
        active.updated_at = Set(now_sec());
        Ok(active.update(&self.db).await?)
    }

    /// Adds a member to one role relationship. Returns false when it was already there.
    pub async fn add_credit(&self, movie_id: i32, partner_id: i32, role: Role) -> AppResult<bool> {
        let model = movie_credit::ActiveModel {
            movie_id: Set(movie_id),
            partner_id: Set(partner_id),
            role: Set(role.as_code().to_string()),
        };
        let inserted = movie_credit::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    movie_credit::Column::MovieId,
                    movie_credit::Column::PartnerId,
                    movie_credit::Column::Role,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted > 0)
    }

    pub async fn remove_credit(
        &self,
        movie_id: i32,
        partner_id: i32,
        role: Role,
    ) -> AppResult<bool> {
        let res = movie_credit::Entity::delete_many()
            .filter(movie_credit::Column::MovieId.eq(movie_id))
            .filter(movie_credit::Column::PartnerId.eq(partner_id))
            .filter(movie_credit::Column::Role.eq(role.as_code()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn add_genre(&self, movie_id: i32, genre_id: i32) -> AppResult<bool> {
        let model = movie_genre::ActiveModel { movie_id: Set(movie_id), genre_id: Set(genre_id) };
        let inserted = movie_genre::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([movie_genre::Column::MovieId, movie_genre::Column::GenreId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(inserted > 0)
    }

    #[cfg(test)]
    pub async fn credits_for(&self, movie_id: i32, role: Role) -> AppResult<Vec<partner::Model>> {
        let rows = movie_credit::Entity::find()
            .filter(movie_credit::Column::MovieId.eq(movie_id))
            .filter(movie_credit::Column::Role.eq(role.as_code()))
            .find_also_related(partner::Entity)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().filter_map(|(_, p)| p).collect())
    }

    /// Case-insensitive substring match on the title. Never reaches the catalog.
    pub async fn search_titles(&self, query: &str) -> AppResult<Vec<MovieListItem>> {
        let rows = movie::Entity::find()
            .filter(
                Expr::col((movie::Entity, movie::Column::Title))
                    .like(LikeExpr::new(contains_pattern(query)).escape(LIKE_ESCAPE)),
            )
            .order_by_asc(movie::Column::Title)
            .find_also_related(stage::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(m, s)| MovieListItem {
                external_id: m.external_id,
                title: m.title,
                release_date: m.release_date,
                stage: s.map(|s| s.name),
            })
            .collect())
    }

    pub async fn movie_view(&self, external_id: i64) -> AppResult<MovieView> {
        let movie = self.get_by_external_id(external_id).await?;

        let stage = match movie.stage_id {
            Some(id) => stage::Entity::find_by_id(id).one(&self.db).await?.map(|s| s.name),
            None => None,
        };
        let language = match movie.language_id {
            Some(id) => language::Entity::find_by_id(id).one(&self.db).await?.map(|l| l.name),
            None => None,
        };

        let mut genres: Vec<String> = movie
            .find_related(genre::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();
        genres.sort();

        let rows = movie_credit::Entity::find()
            .filter(movie_credit::Column::MovieId.eq(movie.id))
            .find_also_related(partner::Entity)
            .all(&self.db)
            .await?;

        let mut credits: BTreeMap<Role, Vec<CreditView>> = BTreeMap::new();
        for (credit, partner) in rows {
            let (Some(role), Some(partner)) = (Role::from_code(&credit.role), partner) else {
                continue;
            };
            credits
                .entry(role)
                .or_default()
                .push(CreditView { partner_id: partner.id, name: partner.name });
        }
        for members in credits.values_mut() {
            members.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(MovieView {
            external_id: movie.external_id,
            title: movie.title,
            storyline: movie.storyline,
            release_date: movie.release_date,
            has_poster: movie.poster.is_some(),
            runtime: movie.runtime,
            rating: Rating::from_code(movie.rating).unwrap_or_default().label(),
            box_office: movie.box_office,
            adult: movie.adult,
            homepage: movie.homepage,
            language,
            stage,
            genres,
            credits,
        })
    }
}

const LIKE_ESCAPE: char = '!';

/// `%query%` with LIKE wildcards in `query` taken literally.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
