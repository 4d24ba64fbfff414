//! Handlers for `GET/PUT/DELETE /v1/users/{id}`.
//!
//! Each handler resolves the requester and target through the
//! authorization resolver, then performs its state transition. The read
//! path additionally races an external profile fetch against the
//! configured deadline; the response is never delayed past it and is
//! emitted exactly once regardless of how the race resolves.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use tracing::{debug, error};

use crate::api::SharedState;
use crate::auth::{AuthzError, AuthzResolver, RequestIdentity, Resolution};
use crate::enrichment::{EnrichmentRace, ProfileClient, ProfileData};
use crate::error::ApiError;
use crate::types::{SessionToken, UserId};
use crate::users::{UserJson, UserPatch, UserRecord};

/// Read a user record.
///
/// The bearer token is optional: without one the target is served in its
/// public view. With one, the requester is resolved by token membership
/// and the `auth` flag decides whether private fields are included.
pub async fn get_user(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<UserJson>), ApiError> {
    let target_id = require_user_id(&user_id)?;
    let identity = RequestIdentity::from_headers(&headers);
    let resolver = AuthzResolver::new(&state.store);

    let (target, auth) = match &identity.token {
        Some(token) => {
            let resolution = resolver.resolve_by_token(token, &target_id).await?;
            let auth = read_auth(&resolution, token);
            (resolution.target, auth)
        }
        None => (resolver.resolve_target(&target_id).await?, false),
    };

    let enrichment = enrich(&state, &target).await;

    let mut json = target.client_json(auth);
    if let Some(profile) = enrichment {
        json.profile_image_url = profile.picture;
    }

    Ok((StatusCode::OK, Json(json)))
}

/// Apply a partial update to a user record.
///
/// Requires an authenticated session; fields omitted from the body keep
/// their stored values. Responds 204 with no body.
pub async fn put_user(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let target_id = require_user_id(&user_id)?;

    let patch: UserPatch = serde_json::from_slice(&body)
        .map_err(|_| ApiError::Validation("Could not parse body as JSON.".to_string()))?;

    let resolution = resolve_mutation(&state, &headers, &target_id).await?;
    if !resolution.permitted {
        return Err(ApiError::PermissionDenied);
    }

    match state.store.update(&resolution.target.user_id, &patch).await {
        Ok(Some(_)) => Ok(StatusCode::NO_CONTENT),
        Ok(None) => Err(ApiError::NotFound("User not found.".to_string())),
        Err(e) => {
            error!(error = %e, target = %target_id, "Failed to update user");
            Err(ApiError::Upstream(
                "Could not update user information.".to_string(),
            ))
        }
    }
}

/// Delete a user record.
///
/// Requires an authenticated session. After the deletion succeeds, the
/// cached profile-image artifact is invalidated best-effort: a cleanup
/// failure is logged and never surfaced, because the primary deletion is
/// already durable and is not rolled back.
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let target_id = require_user_id(&user_id)?;

    let resolution = resolve_mutation(&state, &headers, &target_id).await?;
    if !resolution.permitted {
        return Err(ApiError::PermissionDenied);
    }

    let deleted = match state.store.delete(&resolution.target.user_id).await {
        Ok(deleted) => deleted,
        Err(e) => {
            error!(error = %e, target = %target_id, "Failed to delete user");
            return Err(ApiError::Upstream("Error deleting user.".to_string()));
        }
    };

    if deleted.is_none() {
        return Err(ApiError::NotFound("User not found.".to_string()));
    }

    if let Some(cache) = &state.image_cache {
        if let Err(e) = cache.invalidate(&target_id).await {
            error!(error = %e, target = %target_id, "Failed to invalidate cached profile image");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Validate the path identifier before anything touches the store.
fn require_user_id(raw: &str) -> Result<UserId, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("Please provide user ID.".to_string()));
    }
    Ok(UserId::new(trimmed))
}

/// Resolve requester and target for a mutation request.
///
/// Both the token and the upstream-authenticated requester id are
/// required; the token must be an active session of the requester before
/// any permission is evaluated.
async fn resolve_mutation(
    state: &SharedState,
    headers: &HeaderMap,
    target_id: &UserId,
) -> Result<Resolution, ApiError> {
    let identity = RequestIdentity::from_headers(headers);

    let token = identity
        .token
        .ok_or_else(|| ApiError::Validation("Please provide login token.".to_string()))?;
    let requester_id = identity
        .user_id
        .ok_or_else(|| ApiError::Unauthorized("Authentication required.".to_string()))?;

    AuthzResolver::new(&state.store)
        .resolve_authenticated(&requester_id, &token, target_id)
        .await
        .map_err(|err| match err {
            // On mutation paths a failed session check is a bare denial.
            AuthzError::UnauthorizedAccess => ApiError::PermissionDenied,
            other => other.into(),
        })
}

/// The read-path `auth` flag: the presented token is an active session of
/// the *target* record (self-access), or the requester holds ADMIN. This
/// gates field visibility only; it is not view permission.
fn read_auth(resolution: &Resolution, token: &SessionToken) -> bool {
    resolution.target.has_session(token) || resolution.requester.is_admin()
}

/// Run the enrichment race for a read, or skip it.
///
/// Skipped entirely (response proceeds immediately, unaugmented) when the
/// target already has a cached image, has no linked external profile, or
/// the profile client cannot be constructed.
async fn enrich(state: &SharedState, target: &UserRecord) -> Option<ProfileData> {
    if target.profile_image_url.is_some() {
        return None;
    }

    let profile = target.external_profile.as_ref()?;

    let client = match ProfileClient::for_user(&state.config.enrichment, profile) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Could not initialize profile API client");
            return None;
        }
    };

    debug!(profile_id = %profile.profile_id, "About to call profile service");

    // Fresh race per request; its outcome is the single source of the
    // response's augmentation.
    let race = EnrichmentRace::new(state.config.enrichment.deadline());
    race.run(async move { client.fetch_profile().await }).await
}
