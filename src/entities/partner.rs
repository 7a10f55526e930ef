use sea_orm::entity::prelude::*;

/// A person or an organization. Cast, crew and production companies all land here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "partner")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub tmdb_person_id: Option<i64>,
    pub tmdb_company_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie_credit::Entity")]
    MovieCredit,
}

impl Related<super::movie_credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieCredit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
