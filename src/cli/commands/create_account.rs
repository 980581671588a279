use anyhow::Result;
use domain::identity::{self, NewAccount};
use model::entities::member::Role;
use sea_orm::Database;
use tracing::{info, trace};

pub async fn create_account(
    database_url: &str,
    username: &str,
    password: &str,
    email: &str,
    administrator: bool,
) -> Result<()> {
    trace!("Entering create_account function");
    info!("Creating account '{}'", username);

    let db = Database::connect(database_url).await?;

    let role = if administrator {
        Role::Administrator
    } else {
        Role::Associate
    };

    let account = identity::create_account(
        &db,
        NewAccount {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            member_id: None,
        },
    )
    .await?;

    info!(
        "Account '{}' created with id {} and role {:?}",
        account.username, account.id, account.role
    );
    Ok(())
}
