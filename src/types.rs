//! NewType wrappers for strong typing throughout the user API.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing a session token where a user id is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Application-level user identifier (the handle shown in URLs).
    ///
    /// This is the stable, user-visible id used in `/v1/users/{id}` paths
    /// and stored on the user record. It is distinct from the database
    /// record id, which is storage-internal.
    UserId
);

newtype_string!(
    /// Opaque bearer token identifying one active session.
    ///
    /// A user record holds a set of these (one per concurrent session).
    /// Resolving "who is this request from" is a membership test against
    /// the token sets in the store; there is no separate session table.
    SessionToken
);

newtype_string!(
    /// Identifier of a user's linked account on the external profile service.
    ///
    /// Present only when the user has connected an external profile; used
    /// to fetch their profile image during response enrichment.
    ExternalProfileId
);
