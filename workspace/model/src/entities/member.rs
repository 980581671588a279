use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role assigned to a member (and mirrored onto any linked login account).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "associate")]
    Associate,
    #[sea_orm(string_value = "administrator")]
    Administrator,
}

/// A person on the association's roster. A member may or may not have a
/// login account; the account side of the link lives on `account::Model`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    #[sea_orm(default_value = "true")]
    pub active: bool,
}

impl Model {
    /// "First Last", trimmed so a member with only one name part renders cleanly.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Annual fees owed by this member.
    #[sea_orm(has_many = "super::membership_fee::Entity")]
    MembershipFee,
    /// Event registrations for this member.
    #[sea_orm(has_many = "super::participation::Entity")]
    Participation,
    /// The optional login account linked to this member.
    #[sea_orm(has_one = "super::account::Entity")]
    Account,
}

impl Related<super::membership_fee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MembershipFee.def()
    }
}

impl Related<super::participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participation.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
