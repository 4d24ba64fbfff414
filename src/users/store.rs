//! Durable user storage.

use anyhow::Result;
use serde_json::Value;

use crate::db::Db;
use crate::types::{SessionToken, UserId};
use crate::users::model::{ExternalProfile, UserPatch, UserRecord};

/// Fields for creating a user record.
///
/// Creation never happens through the HTTP surface; this is used by the
/// admin CLI and by tests.
#[derive(Debug, Clone, Default)]
pub struct UserCreate {
    pub user_id: UserId,
    pub session_tokens: Vec<SessionToken>,
    pub roles: Vec<String>,
    pub external_profile: Option<ExternalProfile>,
    pub profile_image_url: Option<String>,
    pub data: Option<Value>,
    pub flags: Option<Value>,
}

/// User store for database operations.
#[derive(Clone)]
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Create a new user store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Look up a user by application-level id.
    pub async fn find_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        let user_id = user_id.clone();

        let query = "SELECT * FROM user WHERE user_id = $user_id LIMIT 1";

        let mut res = self.db.query(query).bind(("user_id", user_id)).await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Look up a user by membership of a token in its session-token set.
    ///
    /// Tokens are operationally unique across records, but the store does
    /// not enforce that; the first match is taken.
    pub async fn find_by_session_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<UserRecord>> {
        let token = token.clone();

        let query = "SELECT * FROM user WHERE $session_token IN session_tokens LIMIT 1";

        let mut res = self.db.query(query).bind(("session_token", token)).await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Apply a partial update to a user record.
    ///
    /// Only the fields present in the patch are written; everything else
    /// keeps its stored value. Returns the updated record, or `None` when
    /// no record matched.
    pub async fn update(&self, user_id: &UserId, patch: &UserPatch) -> Result<Option<UserRecord>> {
        let user_id = user_id.clone();
        let merge = patch.merge_document();

        let query = "UPDATE user MERGE $patch WHERE user_id = $user_id";

        let mut res = self
            .db
            .query(query)
            .bind(("user_id", user_id))
            .bind(("patch", merge))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Delete a user record, returning it as it was before deletion.
    pub async fn delete(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        let user_id = user_id.clone();

        let query = "DELETE user WHERE user_id = $user_id RETURN BEFORE";

        let mut res = self.db.query(query).bind(("user_id", user_id)).await?;

        let users: Vec<UserRecord> = res.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user record.
    pub async fn create(&self, create: UserCreate) -> Result<UserRecord> {
        let query = r#"
            CREATE user CONTENT {
                user_id: $user_id,
                session_tokens: $session_tokens,
                roles: $roles,
                external_profile: $external_profile,
                profile_image_url: $profile_image_url,
                data: $data,
                flags: $flags
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("user_id", create.user_id))
            .bind(("session_tokens", create.session_tokens))
            .bind(("roles", create.roles))
            .bind(("external_profile", create.external_profile))
            .bind(("profile_image_url", create.profile_image_url))
            .bind(("data", create.data))
            .bind(("flags", create.flags))
            .await?;

        let users: Vec<UserRecord> = res.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};

    async fn setup_test_store() -> UserStore {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        UserStore::new(db)
    }

    fn jane() -> UserCreate {
        UserCreate {
            user_id: UserId::new("jane"),
            session_tokens: vec![SessionToken::new("tok_jane")],
            roles: vec!["ADMIN".to_string()],
            data: Some(serde_json::json!({"street": {"width": 40}})),
            flags: Some(serde_json::json!({"beta": true})),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let store = setup_test_store().await;
        let created = store.create(jane()).await.unwrap();
        assert_eq!(created.user_id.as_str(), "jane");

        let found = store.find_by_id(&UserId::new("jane")).await.unwrap();
        let found = found.unwrap();
        assert_eq!(found.user_id, created.user_id);
        assert!(found.has_role("ADMIN"));
    }

    #[tokio::test]
    async fn test_find_by_id_absent() {
        let store = setup_test_store().await;
        let found = store.find_by_id(&UserId::new("nobody")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_by_session_token() {
        let store = setup_test_store().await;
        store.create(jane()).await.unwrap();

        let found = store
            .find_by_session_token(&SessionToken::new("tok_jane"))
            .await
            .unwrap();
        assert_eq!(found.unwrap().user_id.as_str(), "jane");

        let missing = store
            .find_by_session_token(&SessionToken::new("tok_other"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_partially() {
        let store = setup_test_store().await;
        store.create(jane()).await.unwrap();

        let patch = UserPatch {
            flags: Some(serde_json::json!({"beta": false})),
            ..Default::default()
        };
        let updated = store
            .update(&UserId::new("jane"), &patch)
            .await
            .unwrap()
            .unwrap();

        // Patched field changed, everything else kept its value.
        assert_eq!(updated.flags, Some(serde_json::json!({"beta": false})));
        assert_eq!(
            updated.data,
            Some(serde_json::json!({"street": {"width": 40}}))
        );
        assert!(updated.has_role("ADMIN"));
        assert!(updated.has_session(&SessionToken::new("tok_jane")));
    }

    #[tokio::test]
    async fn test_update_can_rename_user_id() {
        let store = setup_test_store().await;
        store.create(jane()).await.unwrap();

        let patch = UserPatch {
            id: Some(UserId::new("janet")),
            ..Default::default()
        };
        let updated = store
            .update(&UserId::new("jane"), &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.user_id.as_str(), "janet");

        assert!(store.find_by_id(&UserId::new("jane")).await.unwrap().is_none());
        assert!(store.find_by_id(&UserId::new("janet")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_absent_user_returns_none() {
        let store = setup_test_store().await;
        let patch = UserPatch::default();
        let updated = store.update(&UserId::new("nobody"), &patch).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = setup_test_store().await;
        store.create(jane()).await.unwrap();

        let deleted = store.delete(&UserId::new("jane")).await.unwrap();
        assert_eq!(deleted.unwrap().user_id.as_str(), "jane");

        assert!(store.find_by_id(&UserId::new("jane")).await.unwrap().is_none());

        // Deleting again matches nothing.
        let again = store.delete(&UserId::new("jane")).await.unwrap();
        assert!(again.is_none());
    }
}
