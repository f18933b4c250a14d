//! # User Repository
//!
//! POS users and login verification.
//!
//! ## Invariants
//! - Usernames are unique within a store
//! - At least one SUPER_ADMIN always exists
//! - You cannot delete yourself, nor demote yourself out of SUPER_ADMIN
//! - Passwords are stored as Argon2 hashes, never plaintext
//!
//! Login/logout events land in the login history as best-effort audit
//! writes; their failure never fails the login itself.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use dukaan_core::{validation, CoreError, LoginAction, Role, User};

use crate::error::{DbError, DbResult};

/// Repository for user management and authentication.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Seeds the default accounts on first open of a fresh store.
    ///
    /// Demo credentials, meant to be changed on day one:
    /// `superadmin/super123`, `admin/admin`, `cashier/1234`.
    pub async fn ensure_defaults(&self) -> DbResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        for (username, password, role) in [
            ("superadmin", "super123", Role::SuperAdmin),
            ("admin", "admin", Role::Admin),
            ("cashier", "1234", Role::Cashier),
        ] {
            let hash = hash_password(password)?;
            sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)")
                .bind(username)
                .bind(&hash)
                .bind(role)
                .execute(&self.pool)
                .await?;
        }

        info!("Seeded default user accounts (change the demo passwords)");
        Ok(())
    }

    /// Verifies a login attempt. Returns the user on success, `None` on bad
    /// credentials. Successful logins are recorded in the login history.
    pub async fn verify_login(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let user = self.get_by_username(username).await?;

        let Some(user) = user else {
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash) {
            debug!(username, "Password mismatch");
            return Ok(None);
        }

        self.record_auth_event(username, LoginAction::Login).await;
        Ok(Some(user))
    }

    /// Records a logout in the login history.
    pub async fn record_logout(&self, username: &str) {
        self.record_auth_event(username, LoginAction::Logout).await;
    }

    /// Lists all users (hashes are never serialized to clients).
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Creates a user. Fails with `Duplicate` for a taken username.
    pub async fn create(&self, username: &str, password: &str, role: Role) -> DbResult<User> {
        validation::validate_username(username).map_err(CoreError::from)?;
        if password.is_empty() {
            return Err(CoreError::Validation(
                dukaan_core::ValidationError::Required {
                    field: "password".to_string(),
                },
            )
            .into());
        }

        if self.get_by_username(username).await?.is_some() {
            return Err(DbError::duplicate("username", username));
        }

        let hash = hash_password(password)?;
        let result =
            sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)")
                .bind(username)
                .bind(&hash)
                .bind(role)
                .execute(&self.pool)
                .await?;

        let id = result.last_insert_rowid();
        info!(username, %role, "User created");

        Ok(User {
            id,
            username: username.to_string(),
            password_hash: hash,
            role,
        })
    }

    /// Updates a user. Password is only changed when one is supplied.
    ///
    /// `acting_username` is whoever is performing the edit: a SUPER_ADMIN
    /// cannot demote themselves.
    pub async fn update(
        &self,
        id: i64,
        username: &str,
        password: Option<&str>,
        role: Role,
        acting_username: &str,
    ) -> DbResult<()> {
        validation::validate_username(username).map_err(CoreError::from)?;

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        if existing.username == acting_username
            && existing.role == Role::SuperAdmin
            && role != Role::SuperAdmin
        {
            return Err(CoreError::SelfDemotion.into());
        }

        // Username must stay unique across the other users.
        if let Some(clash) = self.get_by_username(username).await? {
            if clash.id != id {
                return Err(DbError::duplicate("username", username));
            }
        }

        match password {
            Some(password) if !password.is_empty() => {
                let hash = hash_password(password)?;
                sqlx::query(
                    "UPDATE users SET username = ?2, password_hash = ?3, role = ?4 WHERE id = ?1",
                )
                .bind(id)
                .bind(username)
                .bind(&hash)
                .bind(role)
                .execute(&self.pool)
                .await?;
            }
            _ => {
                sqlx::query("UPDATE users SET username = ?2, role = ?3 WHERE id = ?1")
                    .bind(id)
                    .bind(username)
                    .bind(role)
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    /// Deletes a user, refusing self-deletion and protecting the last
    /// SUPER_ADMIN.
    pub async fn delete(&self, id: i64, acting_username: &str) -> DbResult<()> {
        let user = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        if user.username == acting_username {
            return Err(CoreError::SelfDeletion.into());
        }

        if user.role == Role::SuperAdmin && self.count_super_admins().await? <= 1 {
            return Err(CoreError::LastSuperAdmin.into());
        }

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(username = %user.username, "User deleted");
        Ok(())
    }

    /// Number of SUPER_ADMIN accounts.
    pub async fn count_super_admins(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'SUPER_ADMIN'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Best-effort audit write; failure is logged and swallowed.
    async fn record_auth_event(&self, username: &str, action: LoginAction) {
        let result = sqlx::query(
            "INSERT INTO login_history (username, action, occurred_at) VALUES (?1, ?2, ?3)",
        )
        .bind(username)
        .bind(action)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!(username, error = %e, "Login history write failed");
        }
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage (Argon2id, random salt).
fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbError::Internal(format!("password hashing: {e}")))
}

/// Verifies a password against its stored hash.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    async fn store() -> Store {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        store.users().ensure_defaults().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_default_accounts_and_login() {
        let store = store().await;

        let user = store
            .users()
            .verify_login("superadmin", "super123")
            .await
            .unwrap()
            .expect("valid credentials");
        assert_eq!(user.role, Role::SuperAdmin);

        assert!(store
            .users()
            .verify_login("superadmin", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .users()
            .verify_login("nobody", "super123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_login_records_history() {
        let store = store().await;
        store
            .users()
            .verify_login("cashier", "1234")
            .await
            .unwrap()
            .expect("valid credentials");

        let events = store
            .history()
            .login_history(&Default::default())
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].username, "cashier");
        assert_eq!(events[0].action, LoginAction::Login);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = store().await;
        let err = store
            .users()
            .create("admin", "pw", Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_cannot_delete_last_super_admin() {
        let store = store().await;
        let users = store.users().list().await.unwrap();
        let super_admin = users.iter().find(|u| u.role == Role::SuperAdmin).unwrap();

        let err = store
            .users()
            .delete(super_admin.id, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::LastSuperAdmin)));

        // With a second SUPER_ADMIN the delete goes through.
        store
            .users()
            .create("owner", "secret", Role::SuperAdmin)
            .await
            .unwrap();
        store.users().delete(super_admin.id, "owner").await.unwrap();
        assert_eq!(store.users().count_super_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cannot_delete_yourself() {
        let store = store().await;
        let users = store.users().list().await.unwrap();
        let admin = users.iter().find(|u| u.username == "admin").unwrap();

        let err = store.users().delete(admin.id, "admin").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SelfDeletion)));
    }

    #[tokio::test]
    async fn test_cannot_demote_yourself() {
        let store = store().await;
        let users = store.users().list().await.unwrap();
        let super_admin = users.iter().find(|u| u.role == Role::SuperAdmin).unwrap();

        let err = store
            .users()
            .update(super_admin.id, "superadmin", None, Role::Cashier, "superadmin")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SelfDemotion)));
    }

    #[tokio::test]
    async fn test_update_password_changes_login() {
        let store = store().await;
        let users = store.users().list().await.unwrap();
        let cashier = users.iter().find(|u| u.username == "cashier").unwrap();

        store
            .users()
            .update(cashier.id, "cashier", Some("new-pin"), Role::Cashier, "superadmin")
            .await
            .unwrap();

        assert!(store
            .users()
            .verify_login("cashier", "1234")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .users()
            .verify_login("cashier", "new-pin")
            .await
            .unwrap()
            .is_some());
    }
}
