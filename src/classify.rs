use tracing::debug;

use crate::{
    error::AppResult,
    models::{LinkReport, Role},
    resolver::{self, Candidate, EntityKind},
    store::MovieStore,
    tmdb::Credits,
};

/// Relationship a crew member lands in, keyed on their department.
pub fn crew_role(department: &str) -> Option<Role> {
    match department {
        "Production" => Some(Role::Producer),
        "Sound" => Some(Role::Music),
        "Directing" => Some(Role::Director),
        "Writing" => Some(Role::Writer),
        "Editing" => Some(Role::Editor),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Assignment<'a> {
    pub role: Role,
    pub name: &'a str,
    pub external_id: i64,
}

/// Buckets cast and crew into role relationships. Crew from other departments is dropped.
pub fn classify(credits: &Credits) -> (Vec<Assignment<'_>>, usize) {
    let cast = credits.cast.iter().map(|c| Assignment {
        role: Role::Cast,
        name: &c.name,
        external_id: c.id,
    });

    let mut dropped = 0;
    let crew = credits.crew.iter().filter_map(|c| {
        let role = c.department_label().and_then(crew_role);
        if role.is_none() {
            dropped += 1;
        }
        role.map(|role| Assignment { role, name: &c.name, external_id: c.id })
    });

    let assignments = cast.chain(crew).collect();
    (assignments, dropped)
}

/// Resolves every classified entry and adds it to the movie's relationship.
pub async fn link_credits(
    store: &MovieStore,
    movie_id: i32,
    credits: &Credits,
) -> AppResult<LinkReport> {
    let (assignments, dropped) = classify(credits);
    let mut report = LinkReport { skipped: dropped, ..Default::default() };

    for a in assignments {
        let candidate = Candidate::with_id(a.name, a.external_id);
        let (partner_id, created) =
            resolver::resolve_and_apply(store.db(), EntityKind::Person, candidate).await?;
        if store.add_credit(movie_id, partner_id, a.role).await? {
            report.linked += 1;
        }
        if created {
            report.created += 1;
        }
    }

    debug!(
        movie_id = movie_id,
        linked = report.linked,
        created = report.created,
        skipped = report.skipped,
        "linked credits"
    );
    Ok(report)
}
