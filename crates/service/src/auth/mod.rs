//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Login, password hashing, JWT issue/verify and the role check behind
//! admin-only endpoints all live here, independent of the web framework.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
