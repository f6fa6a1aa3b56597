//! Request middleware and extractors for authentication.

pub mod auth;

pub use auth::AuthUser;
