use sea_orm::entity::prelude::*;

use super::member;
use super::member::Role;

/// A login account. Optionally linked one-to-one to a roster member; an
/// account without a member is a pure staff login, a member without an
/// account is an associate who never logs in.
///
/// The account is authoritative for the role on save: whenever its role
/// changes, a linked member's role is overwritten to match.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string, never the plain password.
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// One-to-one link to the roster. Deleting the member removes the
    /// account (cascade); deleting the account leaves the member alone.
    #[sea_orm(unique)]
    pub member_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "member::Entity",
        from = "Column::MemberId",
        to = "member::Column::Id",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
