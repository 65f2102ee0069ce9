/// Persistence layer
///
/// Users sit behind the `UserStore` trait because the access guard depends
/// on them for every protected request; the other resources are plain query
/// functions over a `PgPool`.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewUser, User};

mod memory;
pub mod payments;
pub mod periodes;
mod postgres;
pub mod transactions;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Duplicate username or email fails with a conflict.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Match `identifier` against email, then username, then phone number.
    /// Phone numbers are not unique; one shared by several users matches
    /// nobody.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError>;

    /// All users, newest first
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Returns `false` if no user had this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
