/// SQL for the client-side snapshot store.
pub struct Queries;

impl Queries {
    /// Create the snapshot schema. A single key/value table: the whole task
    /// collection is serialized under one fixed key.
    pub const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS snapshots (
            key TEXT PRIMARY KEY,
            value JSON NOT NULL,
            saved_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
    "#;

    pub const GET_SNAPSHOT: &'static str = "SELECT value FROM snapshots WHERE key = ?1";

    pub const UPSERT_SNAPSHOT: &'static str = r#"
        INSERT INTO snapshots (key, value, saved_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            saved_at = excluded.saved_at
    "#;

    pub const DELETE_SNAPSHOT: &'static str = "DELETE FROM snapshots WHERE key = ?1";
}
