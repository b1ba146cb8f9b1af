//! Request extractors for authentication.
//!
//! - [`auth::AuthUser`] -- requires a valid access token.
//! - `Option<AuthUser>` -- identifies the caller when a valid token is sent.

pub mod auth;
