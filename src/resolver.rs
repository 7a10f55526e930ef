//! Look-up-or-create for partners and genres.
//!
//! A candidate is matched on its catalog id first, then on its exact name. A name match whose
//! record is already tied to a different catalog id is a namesake, not the same entity.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::{
    entities::{genre, partner},
    error::AppResult,
    store::now_sec,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Person,
    Publisher,
    Genre,
}

#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub external_id: Option<i64>,
}

impl<'a> Candidate<'a> {
    pub fn named(name: &'a str) -> Self {
        Self { name, external_id: None }
    }

    pub fn with_id(name: &'a str, external_id: i64) -> Self {
        Self { name, external_id: Some(external_id) }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// Use the existing record. `claim` is a catalog id to record on it.
    Link { id: i32, claim: Option<i64> },
    Create { name: String, external_id: Option<i64> },
}

impl EntityKind {
    /// Partner column holding this kind's catalog id. Genres keep theirs on the genre row.
    fn partner_id_column(self) -> Option<partner::Column> {
        match self {
            EntityKind::Person => Some(partner::Column::TmdbPersonId),
            EntityKind::Publisher => Some(partner::Column::TmdbCompanyId),
            EntityKind::Genre => None,
        }
    }

    fn stored_partner_id(self, p: &partner::Model) -> Option<i64> {
        match self {
            EntityKind::Person => p.tmdb_person_id,
            _ => p.tmdb_company_id,
        }
    }
}

/// Decides how a candidate maps onto stored records. Reads only.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    candidate: Candidate<'_>,
) -> AppResult<Resolution> {
    let found = match kind.partner_id_column() {
        Some(col) => {
            if let Some(ext) = candidate.external_id {
                if let Some(p) = partner::Entity::find().filter(col.eq(ext)).one(db).await? {
                    return Ok(Resolution::Link { id: p.id, claim: None });
                }
            }

            partner::Entity::find()
                .filter(partner::Column::Name.eq(candidate.name))
                .order_by_asc(partner::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, kind.stored_partner_id(&p)))
                .find(|(_, stored)| compatible(*stored, candidate.external_id))
        },
        None => {
            if let Some(ext) = candidate.external_id {
                if let Some(g) =
                    genre::Entity::find().filter(genre::Column::TmdbId.eq(ext)).one(db).await?
                {
                    return Ok(Resolution::Link { id: g.id, claim: None });
                }
            }

            genre::Entity::find()
                .filter(genre::Column::Name.eq(candidate.name))
                .order_by_asc(genre::Column::Id)
                .all(db)
                .await?
                .into_iter()
                .map(|g| (g.id, g.tmdb_id))
                .find(|(_, stored)| compatible(*stored, candidate.external_id))
        },
    };

    Ok(match found {
        Some((id, stored)) => Resolution::Link {
            id,
            claim: if stored.is_none() { candidate.external_id } else { None },
        },
        None => Resolution::Create {
            name: candidate.name.to_string(),
            external_id: candidate.external_id,
        },
    })
}

fn compatible(stored: Option<i64>, incoming: Option<i64>) -> bool {
    match (stored, incoming) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Carries out a resolution and returns the id of the record to link.
pub async fn apply<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    resolution: Resolution,
) -> AppResult<i32> {
    match (resolution, kind) {
        (Resolution::Link { id, claim: None }, _) => Ok(id),
        (Resolution::Link { id, claim: Some(ext) }, EntityKind::Genre) => {
            genre::ActiveModel { id: Set(id), tmdb_id: Set(Some(ext)), ..Default::default() }
                .update(db)
                .await?;
            Ok(id)
        },
        (Resolution::Link { id, claim: Some(ext) }, _) => {
            let mut active = partner::ActiveModel { id: Set(id), ..Default::default() };
            match kind {
                EntityKind::Person => active.tmdb_person_id = Set(Some(ext)),
                _ => active.tmdb_company_id = Set(Some(ext)),
            }
            active.update(db).await?;
            debug!(partner_id = id, external_id = ext, "claimed catalog id for partner");
            Ok(id)
        },
        (Resolution::Create { name, external_id }, EntityKind::Genre) => {
            let created = genre::ActiveModel {
                id: Default::default(),
                name: Set(name),
                tmdb_id: Set(external_id),
            }
            .insert(db)
            .await?;
            debug!(genre_id = created.id, name = %created.name, "created genre");
            Ok(created.id)
        },
        (Resolution::Create { name, external_id }, _) => {
            let (person, company) = match kind {
                EntityKind::Person => (external_id, None),
                _ => (None, external_id),
            };
            let created = partner::ActiveModel {
                id: Default::default(),
                name: Set(name),
                tmdb_person_id: Set(person),
                tmdb_company_id: Set(company),
                created_at: Set(now_sec()),
            }
            .insert(db)
            .await?;
            debug!(partner_id = created.id, name = %created.name, "created partner");
            Ok(created.id)
        },
    }
}

/// `resolve` followed by `apply`. Reports whether a record was created.
pub async fn resolve_and_apply<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    candidate: Candidate<'_>,
) -> AppResult<(i32, bool)> {
    let resolution = resolve(db, kind, candidate).await?;
    let created = matches!(resolution, Resolution::Create { .. });
    let id = apply(db, kind, resolution).await?;
    Ok((id, created))
}
