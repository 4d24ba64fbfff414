//! User record model and client-facing serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::RecordId;

use crate::types::{ExternalProfileId, SessionToken, UserId};

/// Role implicitly held by every user. Synthesized into serialized role
/// lists even when not persisted, and always placed first.
pub const ROLE_USER: &str = "USER";

/// Role granting access to other users' records.
pub const ROLE_ADMIN: &str = "ADMIN";

/// Linked account on the external profile service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalProfile {
    /// The user's identifier on the external service.
    pub profile_id: ExternalProfileId,
    /// Per-user access credential pair for the external service.
    pub access_key: String,
    pub access_secret: String,
}

/// A user record as stored in the database.
///
/// Created and destroyed by the store; the HTTP surface only reads,
/// partially updates, and deletes these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Storage-internal record id.
    pub id: RecordId,
    /// Application-level identifier, the one used in URLs.
    pub user_id: UserId,
    /// Bearer tokens for the record's active sessions. Membership here is
    /// what makes a presented token an authenticated session.
    #[serde(default)]
    pub session_tokens: Vec<SessionToken>,
    /// Stored role tags. `USER` is implicit and may be absent here.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Linked external profile, if the user connected one.
    #[serde(default)]
    pub external_profile: Option<ExternalProfile>,
    /// Cached profile image URL. When present, reads skip enrichment.
    #[serde(default)]
    pub profile_image_url: Option<String>,
    /// Arbitrary user-editable payload.
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub flags: Option<Value>,
    #[serde(default)]
    pub created_at: Option<surrealdb::sql::Datetime>,
    #[serde(default)]
    pub updated_at: Option<surrealdb::sql::Datetime>,
}

impl UserRecord {
    /// Whether the record holds the given role tag.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether the record holds the ADMIN role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Whether the presented token is one of this record's active sessions.
    pub fn has_session(&self, token: &SessionToken) -> bool {
        self.session_tokens.iter().any(|t| t == token)
    }

    /// Roles as served to clients: `USER` first, stored order after,
    /// duplicates removed.
    pub fn normalized_roles(&self) -> Vec<String> {
        let mut roles = vec![ROLE_USER.to_string()];
        for role in &self.roles {
            if !roles.iter().any(|r| r == role) {
                roles.push(role.clone());
            }
        }
        roles
    }

    /// Serialize for a client response.
    ///
    /// `auth` gates the private fields (`data`, `flags`): they are included
    /// only for self-access or an ADMIN requester. The profile image starts
    /// from the cached value; enrichment overrides it on the response only.
    pub fn client_json(&self, auth: bool) -> UserJson {
        UserJson {
            id: self.user_id.clone(),
            roles: self.normalized_roles(),
            profile_image_url: self.profile_image_url.clone(),
            data: if auth { self.data.clone() } else { None },
            flags: if auth { self.flags.clone() } else { None },
        }
    }
}

/// Client-facing user representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJson {
    pub id: UserId,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<Value>,
}

/// Partial update payload for a user record.
///
/// Every field is optional; an omitted field keeps its stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub flags: Option<Value>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl UserPatch {
    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
            && self.flags.is_none()
            && self.roles.is_none()
            && self.id.is_none()
            && self.profile_image_url.is_none()
    }

    /// Build the merge document with storage field names, containing only
    /// the fields present in the patch.
    pub fn merge_document(&self) -> Value {
        let mut doc = serde_json::Map::new();
        if let Some(data) = &self.data {
            doc.insert("data".to_string(), data.clone());
        }
        if let Some(flags) = &self.flags {
            doc.insert("flags".to_string(), flags.clone());
        }
        if let Some(roles) = &self.roles {
            doc.insert("roles".to_string(), serde_json::json!(roles));
        }
        if let Some(id) = &self.id {
            doc.insert("user_id".to_string(), serde_json::json!(id));
        }
        if let Some(url) = &self.profile_image_url {
            doc.insert("profile_image_url".to_string(), serde_json::json!(url));
        }
        Value::Object(doc)
    }
}
