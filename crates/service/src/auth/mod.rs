//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, logout and profile workflows live here; token
//! mechanics are delegated to the `token` module.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use errors::AuthError;
pub use service::AuthService;
