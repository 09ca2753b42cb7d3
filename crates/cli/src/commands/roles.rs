//! User role commands.

use bramble_core::{UserId, UserRole};
use bramble_storefront::db::RoleRepository;

use super::{CommandError, connect};

/// Print a user's role.
///
/// # Errors
///
/// Returns an error if the user ID is not a UUID or the lookup fails.
pub async fn show(user_id: &str) -> Result<(), CommandError> {
    let user_id = parse_user_id(user_id)?;
    let pool = connect().await?;

    let role = RoleRepository::new(&pool).get_role(user_id).await?;
    tracing::info!("User {user_id} has role {role}");
    Ok(())
}

/// Assign a role to a user.
///
/// # Errors
///
/// Returns an error if an argument is invalid or the update fails.
pub async fn set(user_id: &str, role: &str) -> Result<(), CommandError> {
    let user_id = parse_user_id(user_id)?;
    let role: UserRole = role
        .parse()
        .map_err(|e| CommandError::InvalidArgument(format!("{e}. Valid roles: admin, moderator, customer")))?;
    let pool = connect().await?;

    RoleRepository::new(&pool).set_role(user_id, role).await?;
    tracing::info!("User {user_id} now has role {role}");
    Ok(())
}

fn parse_user_id(value: &str) -> Result<UserId, CommandError> {
    value
        .parse()
        .map_err(|e| CommandError::InvalidArgument(format!("user id {value}: {e}")))
}
