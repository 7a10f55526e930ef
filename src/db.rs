use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use crate::error::AppResult;

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url);
    opts.sqlx_logging(false);
    // Every pooled connection would get its own empty in-memory database.
    if database_url.contains(":memory:") {
        opts.max_connections(1).min_connections(1);
    }

    let db = Database::connect(opts).await?;

    for pragma in [
        "PRAGMA journal_mode=WAL",
        "PRAGMA synchronous=NORMAL",
        "PRAGMA cache_size=-64000",
    ] {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    Migrator::up(&db, None).await?;
    Ok(db)
}

#[cfg(test)]
pub async fn memory() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:").await.expect("in-memory database")
}

#[cfg(test)]
mod tests {
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

    use super::*;
    use crate::entities::{genre, language, partner, stage};

    fn partner_row(name: &str, person: Option<i64>) -> partner::ActiveModel {
        partner::ActiveModel {
            name: Set(name.to_string()),
            tmdb_person_id: Set(person),
            tmdb_company_id: Set(None),
            created_at: Set(0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn migrations_seed_reference_rows() {
        let db = memory().await;

        let stages: Vec<String> =
            stage::Entity::find().all(&db).await.unwrap().into_iter().map(|s| s.name).collect();
        assert!(stages.contains(&"New".to_string()));

        let languages = language::Entity::find().count(&db).await.unwrap();
        assert!(languages > 0);
    }

    #[tokio::test]
    async fn migrating_twice_is_a_no_op() {
        let db = memory().await;
        Migrator::up(&db, None).await.unwrap();

        let stages = stage::Entity::find().count(&db).await.unwrap();
        assert_eq!(stages, 3);
    }

    #[tokio::test]
    async fn a_catalog_id_belongs_to_one_record() {
        let db = memory().await;

        partner_row("Emma Stone", None).insert(&db).await.unwrap();
        partner_row("Emma Stone", None).insert(&db).await.unwrap();
        partner_row("Emma Stone", Some(54693)).insert(&db).await.unwrap();
        assert!(partner_row("Emma Stone", Some(54693)).insert(&db).await.is_err());

        let comedy = |id| genre::ActiveModel {
            name: Set("Comedy".to_string()),
            tmdb_id: Set(Some(id)),
            ..Default::default()
        };
        comedy(35).insert(&db).await.unwrap();
        assert!(comedy(35).insert(&db).await.is_err());

        assert_eq!(partner::Entity::find().count(&db).await.unwrap(), 3);
    }
}
