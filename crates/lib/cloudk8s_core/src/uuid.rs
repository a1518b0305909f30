// Token identifiers.
//
// Every issued JWT carries a `jti` so individual tokens can be told apart in
// logs. UUIDv7 keeps them unique across replicas and roughly time-ordered.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// A fresh `jti` value in hyphenated form.
pub fn token_id() -> String {
    uuidv7().hyphenated().to_string()
}
