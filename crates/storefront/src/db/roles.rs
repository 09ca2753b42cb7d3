//! User role lookup.

use bramble_core::{UserId, UserRole};
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for `storefront.user_role`.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's role. Users without a role row are customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is unknown.
    pub async fn get_role(&self, user_id: UserId) -> Result<UserRole, RepositoryError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT role FROM storefront.user_role WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        stored.map_or(Ok(UserRole::Customer), |role| parse_role(&role))
    }

    /// Assign a role to a user, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_role(&self, user_id: UserId, role: UserRole) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.user_role (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET role = EXCLUDED.role, updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(role.to_string())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

fn parse_role(stored: &str) -> Result<UserRole, RepositoryError> {
    stored
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("{e} in user_role")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stored_roles() {
        assert_eq!(parse_role("admin").unwrap(), UserRole::Admin);
        assert_eq!(parse_role("moderator").unwrap(), UserRole::Moderator);
        assert_eq!(parse_role("customer").unwrap(), UserRole::Customer);
    }

    #[test]
    fn test_unknown_stored_role_is_corruption() {
        let err = parse_role("superuser").unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
        assert!(err.to_string().contains("superuser"));
    }
}
