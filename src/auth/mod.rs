//! Identity resolution and authorization.
//!
//! Two concerns live here:
//!
//! - **Who is asking**: [`RequestIdentity`] carries the raw identity
//!   material from the request (bearer session token, and the requester id
//!   the upstream authentication layer already verified).
//! - **Whose data they may touch**: [`AuthzResolver`] turns that material
//!   plus a target id into requester/target records and a permission
//!   decision, per request, against the user store.
//!
//! The resolver never writes HTTP responses; it produces [`AuthzError`]
//! outcomes that the handler layer translates exactly once.

mod identity;
mod resolver;

pub use identity::RequestIdentity;
pub use resolver::{AuthzError, AuthzResolver, Resolution};
