use uuid::Uuid;

/// Generate an opaque token for `session-id` and `message-id` headers.
///
/// A v4 UUID in simple form: 32 lowercase hex characters, no dashes.
/// Collisions are not checked for.
pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}
