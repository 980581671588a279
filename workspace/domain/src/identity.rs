//! Account management and the account/member role-synchronization rules.
//!
//! The account is authoritative when saved: a role change is mirrored onto
//! the linked member in the same transaction. The roster side calls the same
//! [`sync_linked_roles`] helper when an administrator edits the member
//! instead, so the two paths cannot drift apart.

use model::entities::{
    account, member,
    member::Role,
    prelude::{Account, Member},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::error::{DomainError, Result};

/// Fields for a new login account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub member_id: Option<i32>,
}

/// Profile fields an account holder may change about themselves.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Hash a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DomainError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn is_associate(account: &account::Model) -> bool {
    account.role == Role::Associate
}

pub fn is_administrator(account: &account::Model) -> bool {
    account.role == Role::Administrator
}

/// Capability check invoked at the top of every administrator-only
/// operation, so the gate is visible at each call site.
pub fn require_administrator(account: &account::Model) -> Result<()> {
    if is_administrator(account) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// The name shown for an account: the linked member's full name when there
/// is one, the account's own name otherwise, the username as a last resort.
pub fn display_name(account: &account::Model, linked: Option<&member::Model>) -> String {
    if let Some(member) = linked {
        let full_name = member.full_name();
        if !full_name.is_empty() {
            return full_name;
        }
    }
    let own = format!("{} {}", account.first_name, account.last_name)
        .trim()
        .to_string();
    if own.is_empty() {
        account.username.clone()
    } else {
        own
    }
}

/// Bring the member row and any account linked to it in line with `role`.
/// Called from both the account-save path and the member-save path.
pub async fn sync_linked_roles<C: ConnectionTrait>(
    conn: &C,
    member_id: i32,
    role: Role,
) -> Result<()> {
    if let Some(member) = Member::find_by_id(member_id).one(conn).await? {
        if member.role != role {
            debug!(member_id, ?role, "Syncing member role");
            let mut active: member::ActiveModel = member.into();
            active.role = Set(role);
            active.update(conn).await?;
        }
    }

    if let Some(account) = Account::find()
        .filter(account::Column::MemberId.eq(member_id))
        .one(conn)
        .await?
    {
        if account.role != role {
            debug!(account_id = account.id, ?role, "Syncing account role");
            let mut active: account::ActiveModel = account.into();
            active.role = Set(role);
            active.update(conn).await?;
        }
    }

    Ok(())
}

/// Create a login account. The very first account ever persisted becomes an
/// administrator regardless of the requested role; the check runs against
/// the stored row count inside the transaction, never in-process state.
#[instrument(skip(db, new), fields(username = %new.username))]
pub async fn create_account(db: &DatabaseConnection, new: NewAccount) -> Result<account::Model> {
    let created = db
        .transaction::<_, account::Model, DomainError>(|txn| {
            Box::pin(async move {
                if Account::find()
                    .filter(account::Column::Username.eq(&new.username))
                    .one(txn)
                    .await?
                    .is_some()
                {
                    return Err(DomainError::DuplicateUsername(new.username));
                }

                if let Some(member_id) = new.member_id {
                    if Member::find_by_id(member_id).one(txn).await?.is_none() {
                        return Err(DomainError::NotFound("member"));
                    }
                }

                let existing = Account::find().count(txn).await?;
                let role = if existing == 0 {
                    Role::Administrator
                } else {
                    new.role
                };

                let password_hash = hash_password(&new.password)?;
                let account = account::ActiveModel {
                    username: Set(new.username),
                    password_hash: Set(password_hash),
                    email: Set(new.email),
                    first_name: Set(new.first_name),
                    last_name: Set(new.last_name),
                    role: Set(role),
                    member_id: Set(new.member_id),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                if let Some(member_id) = account.member_id {
                    sync_linked_roles(txn, member_id, account.role).await?;
                }

                Ok(account)
            })
        })
        .await?;

    info!(account_id = created.id, "Account created");
    Ok(created)
}

/// Change an account's role and mirror it onto the linked member, both
/// writes in one transaction.
#[instrument(skip(db))]
pub async fn change_role(
    db: &DatabaseConnection,
    account_id: i32,
    role: Role,
) -> Result<account::Model> {
    let updated = db
        .transaction::<_, account::Model, DomainError>(move |txn| {
            Box::pin(async move {
                let account = Account::find_by_id(account_id)
                    .one(txn)
                    .await?
                    .ok_or(DomainError::NotFound("account"))?;

                let account = if account.role != role {
                    let mut active: account::ActiveModel = account.into();
                    active.role = Set(role);
                    active.update(txn).await?
                } else {
                    account
                };

                if let Some(member_id) = account.member_id {
                    sync_linked_roles(txn, member_id, account.role).await?;
                }

                Ok(account)
            })
        })
        .await?;

    info!(account_id, ?role, "Account role updated");
    Ok(updated)
}

/// Look up an account by username and verify the password. The error never
/// distinguishes an unknown username from a wrong password.
#[instrument(skip(db, password))]
pub async fn verify_credentials(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<account::Model> {
    let account = Account::find()
        .filter(account::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or(DomainError::InvalidCredentials)?;

    if verify_password(password, &account.password_hash) {
        Ok(account)
    } else {
        Err(DomainError::InvalidCredentials)
    }
}

/// Update an account holder's own profile and propagate the shared fields
/// to the linked member, when there is one.
#[instrument(skip(db, update))]
pub async fn update_profile(
    db: &DatabaseConnection,
    account_id: i32,
    update: ProfileUpdate,
) -> Result<account::Model> {
    let updated = db
        .transaction::<_, account::Model, DomainError>(move |txn| {
            Box::pin(async move {
                let account = Account::find_by_id(account_id)
                    .one(txn)
                    .await?
                    .ok_or(DomainError::NotFound("account"))?;

                if Account::find()
                    .filter(account::Column::Username.eq(&update.username))
                    .filter(account::Column::Id.ne(account.id))
                    .one(txn)
                    .await?
                    .is_some()
                {
                    return Err(DomainError::DuplicateUsername(update.username));
                }

                let linked = match account.member_id {
                    Some(member_id) => Member::find_by_id(member_id).one(txn).await?,
                    None => None,
                };

                if let Some(ref member) = linked {
                    if Member::find()
                        .filter(member::Column::Email.eq(&update.email))
                        .filter(member::Column::Id.ne(member.id))
                        .one(txn)
                        .await?
                        .is_some()
                    {
                        return Err(DomainError::DuplicateEmail(update.email));
                    }
                }

                let mut active: account::ActiveModel = account.into();
                active.username = Set(update.username);
                active.first_name = Set(update.first_name.clone());
                active.last_name = Set(update.last_name.clone());
                active.email = Set(update.email.clone());
                let account = active.update(txn).await?;

                if let Some(member) = linked {
                    let mut active: member::ActiveModel = member.into();
                    active.first_name = Set(update.first_name);
                    active.last_name = Set(update.last_name);
                    active.email = Set(update.email);
                    if let Some(phone) = update.phone {
                        active.phone = Set(Some(phone));
                    }
                    active.update(txn).await?;
                }

                Ok(account)
            })
        })
        .await?;

    info!(account_id, "Profile updated");
    Ok(updated)
}

/// Change a password after verifying the current one.
#[instrument(skip(db, old_password, new_password))]
pub async fn change_password(
    db: &DatabaseConnection,
    account_id: i32,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    let account = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("account"))?;

    if !verify_password(old_password, &account.password_hash) {
        return Err(DomainError::InvalidCredentials);
    }

    let password_hash = hash_password(new_password)?;
    let mut active: account::ActiveModel = account.into();
    active.password_hash = Set(password_hash);
    active.update(db).await?;

    info!(account_id, "Password changed");
    Ok(())
}
