//! User repository for database operations.
//!
//! Provides database access for users, password hashes, and shopper
//! profiles. Uses the runtime query API with explicit row mapping; stored
//! emails and phone numbers are re-validated at this boundary.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kingsway_core::{Email, Phone, UserId};

use super::RepositoryError;
use crate::models::user::{Profile, User};

/// Raw user row as stored.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: self.id,
            email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Raw profile row as stored.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    full_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

impl ProfileRow {
    /// Convert to the domain profile.
    ///
    /// A stored phone that no longer parses is dropped rather than failing
    /// the read: the profile is a best-effort prefill source.
    fn into_profile(self) -> Profile {
        let phone = self.phone.as_deref().and_then(|raw| {
            Phone::parse(raw)
                .inspect_err(|e| {
                    tracing::warn!("Dropping malformed profile phone: {e}");
                })
                .ok()
        });

        Profile {
            full_name: self.full_name,
            phone,
            address: self.address,
        }
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with email and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    /// Get a user together with their password hash, for login verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserWithHash {
            id: UserId,
            email: String,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
            password_hash: String,
        }

        let row: Option<UserWithHash> = sqlx::query_as(
            r"
            SELECT id, email, created_at, updated_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let user = UserRow {
                    id: r.id,
                    email: r.email,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                }
                .into_user()?;
                Ok(Some((user, r.password_hash)))
            }
            None => Ok(None),
        }
    }

    /// Get a user's profile, if they saved one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r"
            SELECT full_name, phone, address
            FROM profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    /// Create or update a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_profile(
        &self,
        user_id: UserId,
        profile: &Profile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO profiles (user_id, full_name, phone, address)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                updated_at = now()
            ",
        )
        .bind(user_id)
        .bind(profile.full_name.as_deref())
        .bind(profile.phone.as_ref().map(Phone::as_str))
        .bind(profile.address.as_deref())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
