//! Annual membership fees: one row per member per year.

use chrono::{Datelike, Utc};
use model::entities::{
    account, member, membership_fee,
    membership_fee::FeeStatus,
    prelude::{Member, MembershipFee},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};

use crate::error::{DomainError, Result};
use crate::identity::is_administrator;

/// Default year for a new fee.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Fields for a new fee. `year` defaults to the current calendar year.
#[derive(Debug, Clone)]
pub struct NewFee {
    pub member_id: i32,
    pub year: Option<i32>,
    pub amount: Decimal,
    pub payment_date: Option<chrono::NaiveDate>,
    pub status: FeeStatus,
}

/// Fees visible to the calling account: administrators see every fee joined
/// with its member, associates only their own. An associate with no linked
/// member gets an empty list, not an error.
pub async fn list_fees(
    db: &DatabaseConnection,
    account: &account::Model,
) -> Result<Vec<(membership_fee::Model, Option<member::Model>)>> {
    if is_administrator(account) {
        let fees = MembershipFee::find()
            .find_also_related(Member)
            .order_by_desc(membership_fee::Column::Year)
            .order_by_asc(member::Column::LastName)
            .all(db)
            .await?;
        return Ok(fees);
    }

    let Some(member_id) = account.member_id else {
        return Ok(Vec::new());
    };

    let fees = MembershipFee::find()
        .find_also_related(Member)
        .filter(membership_fee::Column::MemberId.eq(member_id))
        .order_by_desc(membership_fee::Column::Year)
        .all(db)
        .await?;
    Ok(fees)
}

/// Record a fee, enforcing the one-per-member-per-year invariant.
#[instrument(skip(db, new), fields(member_id = new.member_id))]
pub async fn create_fee(db: &DatabaseConnection, new: NewFee) -> Result<membership_fee::Model> {
    if Member::find_by_id(new.member_id).one(db).await?.is_none() {
        return Err(DomainError::NotFound("member"));
    }

    let year = new.year.unwrap_or_else(current_year);

    if MembershipFee::find()
        .filter(membership_fee::Column::MemberId.eq(new.member_id))
        .filter(membership_fee::Column::Year.eq(year))
        .one(db)
        .await?
        .is_some()
    {
        return Err(DomainError::DuplicateFeeYear {
            member_id: new.member_id,
            year,
        });
    }

    let fee = membership_fee::ActiveModel {
        member_id: Set(new.member_id),
        year: Set(year),
        amount: Set(new.amount),
        payment_date: Set(new.payment_date),
        status: Set(new.status),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(fee_id = fee.id, year, "Fee created");
    Ok(fee)
}

/// One member's fees, newest year first. Associates may only ask for their
/// own member; administrators may ask for anyone.
pub async fn fees_for_member(
    db: &DatabaseConnection,
    account: &account::Model,
    member_id: i32,
) -> Result<Vec<membership_fee::Model>> {
    if Member::find_by_id(member_id).one(db).await?.is_none() {
        return Err(DomainError::NotFound("member"));
    }

    if !is_administrator(account) && account.member_id != Some(member_id) {
        return Err(DomainError::Forbidden);
    }

    let fees = MembershipFee::find()
        .filter(membership_fee::Column::MemberId.eq(member_id))
        .order_by_desc(membership_fee::Column::Year)
        .all(db)
        .await?;
    Ok(fees)
}
