use std::collections::HashSet;
use userdao_core::User;

#[test]
fn user_new_sets_defaults() {
    let user = User::new("alice", "secret");

    assert_eq!(user.id, None);
    assert_eq!(user.username, "alice");
    assert_eq!(user.password, "secret");
    assert_eq!(user.email, None);
    assert_eq!(user.age, None);
    assert!(!user.is_persisted());
}

#[test]
fn users_with_same_id_are_equal_regardless_of_fields() {
    let mut first = User::new("alice", "a");
    first.id = Some(5);
    let mut second = User::new("bob", "b").with_age(40);
    second.id = Some(5);

    assert_eq!(first, second);

    second.id = Some(6);
    assert_ne!(first, second);
}

#[test]
fn unsaved_user_equals_only_itself() {
    let first = User::new("alice", "secret");
    let twin = first.clone();

    assert_eq!(first, first);
    assert_ne!(first, twin);

    let mut saved = first.clone();
    saved.id = Some(1);
    assert_ne!(first, saved);
    assert_ne!(saved, first);
}

#[test]
fn hash_set_deduplicates_by_id() {
    let mut a = User::new("alice", "x");
    a.id = Some(1);
    let mut b = User::new("alice-renamed", "y");
    b.id = Some(1);

    let set: HashSet<User> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn display_never_prints_password() {
    let mut user = User::new("alice", "secret").with_email("a@x.com").with_age(30);
    user.id = Some(9);
    assert_eq!(
        user.to_string(),
        "User[id=9,username=alice,email=a@x.com,age=30]"
    );

    let unsaved = User::new("bob", "secret");
    assert_eq!(
        unsaved.to_string(),
        "User[id=null,username=bob,email=null,age=null]"
    );
}

#[test]
fn user_serialization_uses_field_names() {
    let mut user = User::new("alice", "5ebe2294ecd0e0f08eab7690d2a6ee69").with_age(30);
    user.id = Some(1);

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["username"], "alice");
    assert_eq!(json["password"], "5ebe2294ecd0e0f08eab7690d2a6ee69");
    assert!(json["email"].is_null());
    assert_eq!(json["age"], 30);

    let decoded: User = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, user);
    assert_eq!(decoded.age, Some(30));
}
