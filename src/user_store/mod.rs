/// User Directory
///
/// Persistence for user records behind the `UserStore` trait, with a
/// PostgreSQL implementation for deployments and an in-memory one for tests
/// and local runs.

mod memory;
mod postgres;
mod user;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;

pub use memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
pub use user::{Role, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueConstraintViolation` if the email is taken.
    async fn insert(&self, user: &User) -> Result<(), DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, DatabaseError>;

    /// Overwrite the profile fields (email, name, password hash, role) of an
    /// existing user. The stored refresh-token digest is left untouched.
    ///
    /// Fails with `NotFound` if the id is absent. Concurrent updates to the
    /// same user are last-write-wins.
    async fn update(&self, user: &User) -> Result<(), DatabaseError>;

    /// Replace only the refresh-token digest; `None` revokes.
    ///
    /// Fails with `NotFound` if the id is absent.
    async fn set_refresh_token_hash(
        &self,
        id: Uuid,
        hash: Option<&str>,
    ) -> Result<(), DatabaseError>;

    /// Returns false if no user had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}
