//! Row and parameter mapping for the `users` table.
//!
//! # Responsibility
//! - Turn one `users` row into a [`User`].
//! - Build positional parameter lists for insert/update/delete statements.
//!
//! # Invariants
//! - Parameter order matches the placeholder order of the statement it feeds
//!   (see each builder).
//! - Passwords are normalized before they enter a parameter list.
//! - SQL `NULL` maps to `None`, never to a sentinel value.

use crate::hasher::normalize;
use crate::model::user::{User, UserId};
use rusqlite::types::Value;
use rusqlite::Row;

/// Maps the `id, username, password, email, age` columns of `row`.
pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password: row.get("password")?,
        email: row.get("email")?,
        age: row.get("age")?,
    })
}

/// `?1 username, ?2 password, ?3 email, ?4 age`
pub fn insert_params(user: &User) -> Vec<Value> {
    vec![
        Value::Text(user.username.clone()),
        Value::Text(normalize(&user.password)),
        optional_text(user.email.as_deref()),
        optional_age(user.age),
    ]
}

/// `?1 username, ?2 password, ?3 email, ?4 age, ?5 id`
pub fn update_params(user: &User, id: UserId) -> Vec<Value> {
    let mut values = insert_params(user);
    values.push(Value::Integer(id));
    values
}

/// `?1 id`; an unsaved user binds `NULL`, which matches no row.
pub fn delete_params(user: &User) -> Vec<Value> {
    vec![user.id.map_or(Value::Null, Value::Integer)]
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn optional_age(value: Option<u16>) -> Value {
    value.map_or(Value::Null, |age| Value::Integer(i64::from(age)))
}

#[cfg(test)]
mod tests {
    use super::{delete_params, insert_params, update_params, user_from_row};
    use crate::hasher::digest;
    use crate::model::user::User;
    use rusqlite::types::Value;
    use rusqlite::Connection;

    #[test]
    fn insert_params_follow_placeholder_order_and_hash_password() {
        let user = User::new("alice", "secret").with_email("a@x.com").with_age(30);
        assert_eq!(
            insert_params(&user),
            vec![
                Value::Text("alice".into()),
                Value::Text(digest("secret")),
                Value::Text("a@x.com".into()),
                Value::Integer(30),
            ]
        );
    }

    #[test]
    fn update_params_append_id_and_keep_existing_digest() {
        let mut user = User::new("bob", digest("hunter2"));
        user.id = Some(7);
        let values = update_params(&user, 7);
        assert_eq!(values.len(), 5);
        assert_eq!(values[1], Value::Text(digest("hunter2")));
        assert_eq!(values[2], Value::Null);
        assert_eq!(values[3], Value::Null);
        assert_eq!(values[4], Value::Integer(7));
    }

    #[test]
    fn delete_params_bind_null_for_unsaved_user() {
        let user = User::new("carol", "pw");
        assert_eq!(delete_params(&user), vec![Value::Null]);
    }

    #[test]
    fn user_from_row_maps_nulls_to_none() {
        let conn = Connection::open_in_memory().unwrap();
        let user = conn
            .query_row(
                "SELECT 3 AS id, 'dave' AS username, ?1 AS password, NULL AS email, NULL AS age",
                [digest("pw")],
                user_from_row,
            )
            .unwrap();
        assert_eq!(user.id, Some(3));
        assert_eq!(user.username, "dave");
        assert_eq!(user.password, digest("pw"));
        assert_eq!(user.email, None);
        assert_eq!(user.age, None);
    }
}
