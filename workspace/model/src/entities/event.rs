use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// An association event members can register for.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub location: String,
}

impl Model {
    /// Whether the event is still upcoming, evaluated against the caller's
    /// clock rather than a stored flag.
    pub fn is_future(&self, now: NaiveDateTime) -> bool {
        self.date >= now
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Registrations are owned by the event and die with it.
    #[sea_orm(has_many = "super::participation::Entity")]
    Participation,
    /// Ledger entries only weakly reference the event.
    #[sea_orm(has_many = "super::financial_transaction::Entity")]
    FinancialTransaction,
}

impl Related<super::participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participation.def()
    }
}

impl Related<super::financial_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
