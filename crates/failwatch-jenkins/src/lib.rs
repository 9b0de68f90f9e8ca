//! failwatch-jenkins: Jenkins build history provider
//!
//! Talks to the Jenkins JSON API (`/api/json` with `tree` filters) and
//! exposes it through [`failwatch_core::BuildHistory`].
//!
//! - Roster enumeration recurses into folders and multibranch projects,
//!   naming nested jobs `folder/job`, and pages through large folders.
//! - `404` maps to `ProviderError::NotFound`, which the classifier treats
//!   as "never built".

mod api;
pub mod auth;
pub mod client;
mod error;

pub use auth::AuthMethod;
pub use client::{JenkinsClient, JenkinsConfig, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
pub use error::JenkinsError;
