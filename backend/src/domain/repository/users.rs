//! User account operations.

use super::HydraulicRepository;
use super::statements::{INSERT_USER, SELECT_USER};
use crate::domain::ports::{SqlExecutor, SqlExecutorExt, StoreError};
use crate::domain::{NewUser, Statement, UserRecord};

impl<E> HydraulicRepository<E>
where
    E: SqlExecutor + ?Sized,
{
    /// Insert a user. Returns `false` when the username is already taken.
    pub async fn add_user(&self, user: &NewUser) -> Result<bool, StoreError> {
        let statement = Statement::new(INSERT_USER)
            .bind(user.username())
            .bind(user.password_hash())
            .bind(user.display_name())
            .bind(user.email());
        self.insert_unique(statement, "user").await
    }

    /// Fetch a user by username.
    pub async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let statement = Statement::new(SELECT_USER).bind(username);
        let Some(row) = self.executor.fetch_one(&statement).await? else {
            return Ok(None);
        };
        Ok(Some(UserRecord {
            username: row.text("username")?.to_owned(),
            password_hash: row.text("password")?.to_owned(),
            display_name: row.text("name")?.to_owned(),
            email: row.optional_text("email")?.map(str::to_owned),
        }))
    }
}
