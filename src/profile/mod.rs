//! Profile Intake
//!
//! Looks up a LinkedIn profile through the enrichment API and maps it into
//! the read-only [`Profile`] record that parameterises coaching sessions.

mod client;
mod model;

pub use client::{is_valid_linkedin_url, map_profile, ProfileClient, ProfileEnvelope};
pub use model::{Personality, Profile, WorkEntry};
