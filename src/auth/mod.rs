//! OAuth 2.0 support

pub mod oauth2;

pub use oauth2::{OAuth2Client, TokenResponse};
