use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stage::Table)
                    .if_not_exists()
                    .col(pk_auto(Stage::Id))
                    .col(string(Stage::Name).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Language::Table)
                    .if_not_exists()
                    .col(pk_auto(Language::Id))
                    .col(string(Language::IsoCode).unique_key())
                    .col(string(Language::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(big_integer(Movie::ExternalId).unique_key())
                    .col(string(Movie::Title))
                    .col(text_null(Movie::Storyline))
                    .col(string_null(Movie::ReleaseDate))
                    .col(text_null(Movie::Poster))
                    .col(double_null(Movie::Runtime))
                    .col(integer(Movie::Rating).default(0))
                    .col(double_null(Movie::BoxOffice))
                    .col(boolean(Movie::Adult).default(false))
                    .col(string_null(Movie::Homepage))
                    .col(integer_null(Movie::LanguageId))
                    .col(integer_null(Movie::StageId))
                    .col(big_integer(Movie::CreatedAt))
                    .col(big_integer(Movie::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_language")
                            .from(Movie::Table, Movie::LanguageId)
                            .to(Language::Table, Language::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_stage")
                            .from(Movie::Table, Movie::StageId)
                            .to(Stage::Table, Stage::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .to_owned(),
            )
            .await?;

        // Names are deliberately not unique: two people can share one.
        manager
            .create_table(
                Table::create()
                    .table(Partner::Table)
                    .if_not_exists()
                    .col(pk_auto(Partner::Id))
                    .col(string(Partner::Name))
                    .col(big_integer_null(Partner::TmdbPersonId))
                    .col(big_integer_null(Partner::TmdbCompanyId))
                    .col(big_integer(Partner::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_partner_name")
                    .table(Partner::Table)
                    .col(Partner::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(string(Genre::Name))
                    .col(big_integer_null(Genre::TmdbId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieCredit::Table)
                    .if_not_exists()
                    .col(integer(MovieCredit::MovieId))
                    .col(integer(MovieCredit::PartnerId))
                    .col(string(MovieCredit::Role))
                    .primary_key(
                        Index::create()
                            .col(MovieCredit::MovieId)
                            .col(MovieCredit::PartnerId)
                            .col(MovieCredit::Role),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_credit_movie")
                            .from(MovieCredit::Table, MovieCredit::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_credit_partner")
                            .from(MovieCredit::Table, MovieCredit::PartnerId)
                            .to(Partner::Table, Partner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieGenre::Table)
                    .if_not_exists()
                    .col(integer(MovieGenre::MovieId))
                    .col(integer(MovieGenre::GenreId))
                    .primary_key(Index::create().col(MovieGenre::MovieId).col(MovieGenre::GenreId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre_movie")
                            .from(MovieGenre::Table, MovieGenre::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genre_genre")
                            .from(MovieGenre::Table, MovieGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieGenre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieCredit::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Partner::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Language::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Stage::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Stage {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Language {
    Table,
    Id,
    IsoCode,
    Name,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    ExternalId,
    Title,
    Storyline,
    ReleaseDate,
    Poster,
    Runtime,
    Rating,
    BoxOffice,
    Adult,
    Homepage,
    LanguageId,
    StageId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Partner {
    Table,
    Id,
    Name,
    TmdbPersonId,
    TmdbCompanyId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    Name,
    TmdbId,
}

#[derive(DeriveIden)]
enum MovieCredit {
    Table,
    MovieId,
    PartnerId,
    Role,
}

#[derive(DeriveIden)]
enum MovieGenre {
    Table,
    MovieId,
    GenreId,
}
