use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Lowercased; unique when present, multiple NULLs allowed.
    #[sea_orm(unique)]
    pub email: Option<String>,

    /// Argon2id hash; present only for local accounts.
    pub password_hash: Option<String>,

    pub google_id: Option<String>,

    pub facebook_id: Option<String>,

    pub is_federated: bool,

    /// "google" or "facebook" when federated.
    pub oauth_provider: Option<String>,

    pub display_name: Option<String>,

    pub profile_picture: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pets::Entity")]
    Pets,
}

impl Related<super::pets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
