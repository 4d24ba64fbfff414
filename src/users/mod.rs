//! User records: the identity and authorization unit of the API.

mod model;
mod store;

pub use model::{ExternalProfile, ROLE_ADMIN, ROLE_USER, UserJson, UserPatch, UserRecord};
pub use store::{UserCreate, UserStore};
