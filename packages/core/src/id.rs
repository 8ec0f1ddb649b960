use rand::Rng;
use uuid::Uuid;

/// Generate a client-side entity id (UUID v4).
///
/// Used when an entity is created against the local store and no server
/// is around to mint an id.
pub fn generate_local_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a server-side entity id: 24 lowercase hex characters.
///
/// The shape is opaque to callers and deliberately differs from local
/// UUIDs; nothing outside the server may assume either format.
pub fn generate_server_id() -> String {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}
