//! User domain model.
//!
//! # Responsibility
//! - Define the single persisted entity handled by the data-access layer.
//! - Define identity semantics (`PartialEq`/`Hash`) on the surrogate key.
//!
//! # Invariants
//! - `id == None` means the user has not been persisted yet.
//! - Two users are equal only when both carry the same `Some(id)`.
//! - A user without id is equal only to itself.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Store-assigned surrogate key.
pub type UserId = i64;

/// One row of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on insert; cleared again on delete.
    pub id: Option<UserId>,
    /// Unique login name.
    pub username: String,
    /// Plaintext before the first write, MD5 hex digest afterwards.
    pub password: String,
    /// Unique when present.
    pub email: Option<String>,
    pub age: Option<u16>,
}

impl User {
    /// Creates an unsaved user with required fields only.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password: password.into(),
            email: None,
            age: None,
        }
    }

    /// Sets the optional email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the optional age.
    pub fn with_age(mut self, age: u16) -> Self {
        self.age = Some(age);
        self
    }

    /// Returns whether the store has assigned an id to this value.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(left), Some(right)) => left == right,
            _ => std::ptr::eq(self, other),
        }
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Log-friendly rendering. The password is never printed.
impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "User[id=")?;
        match self.id {
            Some(id) => write!(f, "{id}")?,
            None => write!(f, "null")?,
        }
        write!(
            f,
            ",username={},email={},age=",
            self.username,
            self.email.as_deref().unwrap_or("null")
        )?;
        match self.age {
            Some(age) => write!(f, "{age}]"),
            None => write!(f, "null]"),
        }
    }
}
