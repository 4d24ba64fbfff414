//! Response enrichment from the external profile service.
//!
//! A read response may be augmented with the target's profile image,
//! fetched from an external social-profile API. The service is slow and
//! unreliable, so the fetch is raced against a configured deadline:
//! whichever finishes first decides the response, and exactly one response
//! is produced no matter how the race goes. A fetch that loses keeps
//! running in the background; its result is logged and discarded.

mod client;
mod race;

pub use client::{ProfileClient, ProfileData};
pub use race::EnrichmentRace;
