//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and lookup APIs over the `users` table.
//! - Keep SQL text and parameter order inside the persistence boundary.
//!
//! # Invariants
//! - `create` requires `id == None` and writes the generated key back.
//! - `update` requires `id != None`.
//! - `delete` clears the caller's `id` only after a row was removed.
//! - Mutations that affect zero rows fail with `StoreOperationFailure`.
//! - Lookups return `Ok(None)` for missing rows.
//! - `list` is ordered by ascending `id`.

use crate::db::statement::{execute_mutation, query_exists, query_first, query_rows};
use crate::db::{ConnectionProvider, ConnectionSource};
use crate::error::{DaoError, DaoResult};
use crate::hasher::normalize;
use crate::model::user::{User, UserId};
use crate::repo::mapper::{delete_params, insert_params, update_params, user_from_row};
use log::{debug, info};
use rusqlite::types::Value;

const USER_SELECT_SQL: &str = "SELECT id, username, password, email, age FROM users";

const SQL_INSERT: &str = "INSERT INTO users (username, password, email, age)
    VALUES (?1, ?2, ?3, ?4);";
const SQL_UPDATE: &str = "UPDATE users
    SET username = ?1, password = ?2, email = ?3, age = ?4
    WHERE id = ?5;";
const SQL_DELETE: &str = "DELETE FROM users WHERE id = ?1;";
const SQL_EXIST_USERNAME: &str = "SELECT id FROM users WHERE username = ?1;";
const SQL_EXIST_EMAIL: &str = "SELECT id FROM users WHERE email = ?1;";

/// Repository interface for user persistence.
pub trait UserRepository {
    /// Returns the user with `id`, if any.
    fn find(&self, id: UserId) -> DaoResult<Option<User>>;
    /// Returns the user matching `username` and the normalized `password`.
    fn find_by_credentials(&self, username: &str, password: &str) -> DaoResult<Option<User>>;
    /// Returns the user with `username`, if any.
    fn find_by_name(&self, username: &str) -> DaoResult<Option<User>>;
    /// Returns every user ordered by ascending id.
    fn list(&self) -> DaoResult<Vec<User>>;
    /// Inserts an unsaved user and stores the generated id into `user.id`.
    fn create(&self, user: &mut User) -> DaoResult<()>;
    /// Overwrites the row identified by `user.id`.
    fn update(&self, user: &User) -> DaoResult<()>;
    /// Creates when `user.id` is `None`, updates otherwise.
    fn save(&self, user: &mut User) -> DaoResult<()> {
        if user.is_persisted() {
            self.update(user)
        } else {
            self.create(user)
        }
    }
    /// Removes the row identified by `user.id` and clears `user.id`.
    fn delete(&self, user: &mut User) -> DaoResult<()>;
    /// Returns whether any user has `username`.
    fn exist_username(&self, username: &str) -> DaoResult<bool>;
    /// Returns whether any user has `email`.
    fn exist_email(&self, email: &str) -> DaoResult<bool>;
}

/// SQLite-backed user repository.
///
/// Holds only the provider; every call acquires and releases its own
/// connection, so one instance can serve concurrent callers.
pub struct SqliteUserRepository<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteUserRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn source(&self) -> ConnectionSource<'_> {
        ConnectionSource::Provider(&self.provider)
    }

    fn find_one(&self, filter: &str, params: &[Value]) -> DaoResult<Option<User>> {
        query_first(
            self.source(),
            &format!("{USER_SELECT_SQL} WHERE {filter};"),
            params,
            user_from_row,
        )
    }
}

impl<P: ConnectionProvider> UserRepository for SqliteUserRepository<P> {
    fn find(&self, id: UserId) -> DaoResult<Option<User>> {
        self.find_one("id = ?1", &[Value::Integer(id)])
    }

    fn find_by_credentials(&self, username: &str, password: &str) -> DaoResult<Option<User>> {
        self.find_one(
            "username = ?1 AND password = ?2",
            &[
                Value::Text(username.to_string()),
                Value::Text(normalize(password)),
            ],
        )
    }

    fn find_by_name(&self, username: &str) -> DaoResult<Option<User>> {
        self.find_one("username = ?1", &[Value::Text(username.to_string())])
    }

    fn list(&self) -> DaoResult<Vec<User>> {
        query_rows(
            self.source(),
            &format!("{USER_SELECT_SQL} ORDER BY id ASC;"),
            &[],
            user_from_row,
        )
    }

    fn create(&self, user: &mut User) -> DaoResult<()> {
        if let Some(id) = user.id {
            return Err(DaoError::PreconditionViolation(format!(
                "user is already created, id {id} is not null"
            )));
        }

        let outcome = execute_mutation(self.source(), SQL_INSERT, true, &insert_params(user))?;
        if outcome.affected_rows == 0 {
            return Err(DaoError::store_contract(
                "creating user failed, no rows affected",
            ));
        }
        let id = outcome.generated_key.ok_or_else(|| {
            DaoError::store_contract("creating user failed, no generated key obtained")
        })?;

        user.id = Some(id);
        info!("event=user_create module=repo status=ok user_id={id}");
        Ok(())
    }

    fn update(&self, user: &User) -> DaoResult<()> {
        let id = user.id.ok_or_else(|| {
            DaoError::PreconditionViolation("user is not created yet, id is null".to_string())
        })?;

        let outcome = execute_mutation(self.source(), SQL_UPDATE, false, &update_params(user, id))?;
        if outcome.affected_rows == 0 {
            return Err(DaoError::store_contract(format!(
                "updating user {id} failed, no rows affected"
            )));
        }

        debug!("event=user_update module=repo status=ok user_id={id}");
        Ok(())
    }

    fn delete(&self, user: &mut User) -> DaoResult<()> {
        let outcome = execute_mutation(self.source(), SQL_DELETE, false, &delete_params(user))?;
        if outcome.affected_rows == 0 {
            return Err(DaoError::store_contract(
                "deleting user failed, no rows affected",
            ));
        }

        if let Some(id) = user.id.take() {
            info!("event=user_delete module=repo status=ok user_id={id}");
        }
        Ok(())
    }

    fn exist_username(&self, username: &str) -> DaoResult<bool> {
        query_exists(
            self.source(),
            SQL_EXIST_USERNAME,
            &[Value::Text(username.to_string())],
        )
    }

    fn exist_email(&self, email: &str) -> DaoResult<bool> {
        query_exists(self.source(), SQL_EXIST_EMAIL, &[Value::Text(email.to_string())])
    }
}
