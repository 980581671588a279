//! Member lifecycle: the roster an administrator maintains.

use model::entities::{
    account, member,
    member::Role,
    prelude::{Account, Member},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::error::{DomainError, Result};
use crate::identity::{hash_password, sync_linked_roles};

/// Editable member fields.
#[derive(Debug, Clone)]
pub struct MemberFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
}

/// All members, ordered by last name then first name.
pub async fn list_members(db: &DatabaseConnection) -> Result<Vec<member::Model>> {
    let members = Member::find()
        .order_by_asc(member::Column::LastName)
        .order_by_asc(member::Column::FirstName)
        .all(db)
        .await?;
    Ok(members)
}

/// A single member, by id.
pub async fn get_member(db: &DatabaseConnection, member_id: i32) -> Result<member::Model> {
    Member::find_by_id(member_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("member"))
}

#[instrument(skip(db, fields), fields(email = %fields.email))]
pub async fn create_member(db: &DatabaseConnection, fields: MemberFields) -> Result<member::Model> {
    if Member::find()
        .filter(member::Column::Email.eq(&fields.email))
        .one(db)
        .await?
        .is_some()
    {
        return Err(DomainError::DuplicateEmail(fields.email));
    }

    let member = member::ActiveModel {
        first_name: Set(fields.first_name),
        last_name: Set(fields.last_name),
        email: Set(fields.email),
        phone: Set(fields.phone),
        role: Set(fields.role),
        active: Set(fields.active),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(member_id = member.id, "Member created");
    Ok(member)
}

/// Update a member. When the member has a login account the account's role
/// is re-synchronized to the new member role in the same transaction; this
/// is the mirror direction of the account-save path.
#[instrument(skip(db, fields))]
pub async fn update_member(
    db: &DatabaseConnection,
    member_id: i32,
    fields: MemberFields,
) -> Result<member::Model> {
    let updated = db
        .transaction::<_, member::Model, DomainError>(move |txn| {
            Box::pin(async move {
                let member = Member::find_by_id(member_id)
                    .one(txn)
                    .await?
                    .ok_or(DomainError::NotFound("member"))?;

                if Member::find()
                    .filter(member::Column::Email.eq(&fields.email))
                    .filter(member::Column::Id.ne(member.id))
                    .one(txn)
                    .await?
                    .is_some()
                {
                    return Err(DomainError::DuplicateEmail(fields.email));
                }

                let mut active: member::ActiveModel = member.into();
                active.first_name = Set(fields.first_name);
                active.last_name = Set(fields.last_name);
                active.email = Set(fields.email);
                active.phone = Set(fields.phone);
                active.role = Set(fields.role);
                active.active = Set(fields.active);
                let member = active.update(txn).await?;

                sync_linked_roles(txn, member.id, member.role).await?;

                Ok(member)
            })
        })
        .await?;

    info!(member_id, "Member updated");
    Ok(updated)
}

/// Delete a member. Fees, participations and any linked account go with it
/// through the schema's cascade rules.
#[instrument(skip(db))]
pub async fn delete_member(db: &DatabaseConnection, member_id: i32) -> Result<()> {
    let result = Member::delete_by_id(member_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound("member"));
    }
    info!(member_id, "Member deleted");
    Ok(())
}

/// Create a member together with its login account in one transaction.
/// A username or email collision rolls the whole operation back, so a
/// failed account creation can never leave an orphaned member behind.
#[instrument(skip(db, fields, password), fields(username = %username))]
pub async fn create_member_with_account(
    db: &DatabaseConnection,
    fields: MemberFields,
    username: String,
    password: String,
) -> Result<(member::Model, account::Model)> {
    let created = db
        .transaction::<_, (member::Model, account::Model), DomainError>(move |txn| {
            Box::pin(async move {
                if Account::find()
                    .filter(account::Column::Username.eq(&username))
                    .one(txn)
                    .await?
                    .is_some()
                {
                    return Err(DomainError::DuplicateUsername(username));
                }

                if Member::find()
                    .filter(member::Column::Email.eq(&fields.email))
                    .one(txn)
                    .await?
                    .is_some()
                {
                    return Err(DomainError::DuplicateEmail(fields.email));
                }

                let member = member::ActiveModel {
                    first_name: Set(fields.first_name),
                    last_name: Set(fields.last_name),
                    email: Set(fields.email),
                    phone: Set(fields.phone),
                    role: Set(fields.role),
                    active: Set(fields.active),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let password_hash = hash_password(&password)?;
                let account = account::ActiveModel {
                    username: Set(username),
                    password_hash: Set(password_hash),
                    email: Set(member.email.clone()),
                    first_name: Set(member.first_name.clone()),
                    last_name: Set(member.last_name.clone()),
                    role: Set(member.role),
                    member_id: Set(Some(member.id)),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok((member, account))
            })
        })
        .await?;

    info!(member_id = created.0.id, account_id = created.1.id, "Member and account created");
    Ok(created)
}
