//! Authorization resolution for the user resource.

use std::fmt;

use tracing::error;

use crate::error::ApiError;
use crate::types::{SessionToken, UserId};
use crate::users::{UserRecord, UserStore};

/// Failures produced while resolving requester and target.
#[derive(Debug, Clone)]
pub enum AuthzError {
    /// Requester or target identifier does not resolve to a record.
    UserNotFound,
    /// Presented token matches no record's session set, or is not an
    /// active session of the requester.
    UnauthorizedAccess,
    /// The store itself failed.
    CannotGetUser(String),
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound => write!(f, "User not found"),
            Self::UnauthorizedAccess => write!(f, "Unauthorised access"),
            Self::CannotGetUser(msg) => write!(f, "Cannot get user: {}", msg),
        }
    }
}

impl std::error::Error for AuthzError {}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::UserNotFound => ApiError::NotFound("User not found.".to_string()),
            AuthzError::UnauthorizedAccess => {
                ApiError::Unauthorized("User with that login token not found.".to_string())
            }
            AuthzError::CannotGetUser(_) => ApiError::Upstream("Error finding user.".to_string()),
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub requester: UserRecord,
    pub target: UserRecord,
    /// Whether the requester may mutate the target: self-access, or the
    /// requester holds the ADMIN role.
    pub permitted: bool,
}

/// Resolves requester identity and target access for one request.
///
/// Constructed fresh per request; holds no state beyond the store handle.
pub struct AuthzResolver<'a> {
    store: &'a UserStore,
}

impl<'a> AuthzResolver<'a> {
    pub fn new(store: &'a UserStore) -> Self {
        Self { store }
    }

    /// Resolve requester and target for the read path.
    ///
    /// The requester is whoever owns the presented token; a token matching
    /// no record is an authorization failure, not a 404. When the requester
    /// is the target, the same in-memory record serves both sides so the
    /// permission check and the response see one consistent view.
    pub async fn resolve_by_token(
        &self,
        token: &SessionToken,
        target_id: &UserId,
    ) -> Result<Resolution, AuthzError> {
        let requester = self
            .store
            .find_by_session_token(token)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to look up user by session token");
                AuthzError::CannotGetUser(e.to_string())
            })?
            .ok_or(AuthzError::UnauthorizedAccess)?;

        let target = if requester.user_id == *target_id {
            requester.clone()
        } else {
            self.find_target(target_id).await?
        };

        let permitted = requester.user_id == target.user_id || requester.is_admin();

        Ok(Resolution {
            requester,
            target,
            permitted,
        })
    }

    /// Resolve requester and target for mutation paths.
    ///
    /// The requester id comes from the upstream authentication layer, but
    /// that alone is not proof of an authenticated session: the presented
    /// token must be an active session of the requester record before any
    /// permission is evaluated.
    pub async fn resolve_authenticated(
        &self,
        requester_id: &UserId,
        token: &SessionToken,
        target_id: &UserId,
    ) -> Result<Resolution, AuthzError> {
        let requester = self
            .store
            .find_by_id(requester_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to look up requesting user");
                AuthzError::CannotGetUser(e.to_string())
            })?
            .ok_or(AuthzError::UserNotFound)?;

        // Authentication strictly before authorization: no role is
        // consulted until the session is proven genuine.
        if !requester.has_session(token) {
            return Err(AuthzError::UnauthorizedAccess);
        }

        let target = if requester.user_id == *target_id {
            requester.clone()
        } else {
            self.find_target(target_id).await?
        };

        let permitted = requester.user_id == target.user_id || requester.is_admin();

        Ok(Resolution {
            requester,
            target,
            permitted,
        })
    }

    /// Resolve only the target, for tokenless reads.
    pub async fn resolve_target(&self, target_id: &UserId) -> Result<UserRecord, AuthzError> {
        self.find_target(target_id).await
    }

    async fn find_target(&self, target_id: &UserId) -> Result<UserRecord, AuthzError> {
        self.store
            .find_by_id(target_id)
            .await
            .map_err(|e| {
                error!(error = %e, target = %target_id, "Failed to look up target user");
                AuthzError::CannotGetUser(e.to_string())
            })?
            .ok_or(AuthzError::UserNotFound)
    }
}
