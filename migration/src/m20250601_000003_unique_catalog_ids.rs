use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index, table, column) for every catalog id a record can claim.
const INDEXES: [(&str, Ids, Ids); 3] = [
    ("idx_partner_tmdb_person_id", Ids::Partner, Ids::TmdbPersonId),
    ("idx_partner_tmdb_company_id", Ids::Partner, Ids::TmdbCompanyId),
    ("idx_genre_tmdb_id", Ids::Genre, Ids::TmdbId),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite treats NULLs as distinct here, so records without a catalog id never collide.
        for (name, table, column) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(column)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in INDEXES {
            manager.drop_index(Index::drop().name(name).table(table).to_owned()).await?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, DeriveIden)]
enum Ids {
    Partner,
    TmdbPersonId,
    TmdbCompanyId,
    Genre,
    TmdbId,
}
