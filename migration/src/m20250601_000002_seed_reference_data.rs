use sea_orm_migration::prelude::*;

const STAGES: &[&str] = &["New", "In Review", "Reviewed"];

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("hi", "Hindi"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("no", "Norwegian"),
    ("tr", "Turkish"),
    ("th", "Thai"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut stages = Query::insert();
        stages.into_table(Stage::Table).columns([Stage::Name]);
        for name in STAGES {
            stages.values_panic([(*name).into()]);
        }
        manager.exec_stmt(stages).await?;

        let mut languages = Query::insert();
        languages.into_table(Language::Table).columns([Language::IsoCode, Language::Name]);
        for (code, name) in LANGUAGES {
            languages.values_panic([(*code).into(), (*name).into()]);
        }
        manager.exec_stmt(languages).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Language::Table)
                    .and_where(
                        Expr::col(Language::IsoCode)
                            .is_in(LANGUAGES.iter().map(|(code, _)| *code)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Stage::Table)
                    .and_where(Expr::col(Stage::Name).is_in(STAGES.iter().copied()))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Stage {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Language {
    Table,
    IsoCode,
    Name,
}
