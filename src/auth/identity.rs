//! Per-request identity material extracted from HTTP headers.

use axum::http::HeaderMap;

use crate::types::{SessionToken, UserId};

/// Header carrying the requester id that the upstream authentication layer
/// has already verified. Mutation paths use this as the requester identity;
/// the session token must still prove it.
pub const AUTH_USER_ID_HEADER: &str = "X-Auth-User-Id";

/// Raw identity material presented with a request.
///
/// Constructed fresh for every request; never shared or cached.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity {
    /// Bearer session token, if one was presented.
    pub token: Option<SessionToken>,
    /// Upstream-authenticated requester id, if the request passed through
    /// the authentication layer.
    pub user_id: Option<UserId>,
}

impl RequestIdentity {
    /// Extract identity material from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .filter(|s| !s.is_empty())
            .map(SessionToken::new);

        let user_id = headers
            .get(AUTH_USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(UserId::new);

        Self { token, user_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok_abc"),
        );

        let identity = RequestIdentity::from_headers(&headers);
        assert_eq!(identity.token, Some(SessionToken::new("tok_abc")));
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn test_ignores_non_bearer_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        let identity = RequestIdentity::from_headers(&headers);
        assert!(identity.token.is_none());
    }

    #[test]
    fn test_extracts_upstream_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_USER_ID_HEADER, HeaderValue::from_static("jane"));

        let identity = RequestIdentity::from_headers(&headers);
        assert_eq!(identity.user_id, Some(UserId::new("jane")));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer "),
        );
        headers.insert(AUTH_USER_ID_HEADER, HeaderValue::from_static(""));

        let identity = RequestIdentity::from_headers(&headers);
        assert!(identity.token.is_none());
        assert!(identity.user_id.is_none());
    }
}
