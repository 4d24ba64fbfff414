//! Database schema for the user store.

use anyhow::Result;

use crate::db::Db;

/// Define the `user` table and its indexes.
///
/// The table is schemaless because `data` and `flags` are arbitrary
/// user-editable JSON; the fields that the API itself depends on are
/// still declared so the database rejects malformed writes to them.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        "DEFINE TABLE user SCHEMALESS;
         DEFINE FIELD user_id ON TABLE user TYPE string;
         DEFINE FIELD session_tokens ON TABLE user TYPE array<string> DEFAULT [];
         DEFINE FIELD roles ON TABLE user TYPE array<string> DEFAULT [];
         DEFINE FIELD profile_image_url ON TABLE user TYPE option<string>;
         DEFINE FIELD external_profile ON TABLE user TYPE option<object>;
         DEFINE FIELD created_at ON TABLE user VALUE time::now();
         DEFINE FIELD updated_at ON TABLE user VALUE time::now();",
        // Lookups are by app-level id and by session-token membership.
        "DEFINE INDEX user_user_id ON TABLE user COLUMNS user_id UNIQUE;
         DEFINE INDEX user_session_tokens ON TABLE user COLUMNS session_tokens;",
    ];

    for query in schema_queries {
        db.query(query).await?;
    }

    Ok(())
}
