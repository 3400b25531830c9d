//! Token Broker
//!
//! Turns a stored client into a bearer token. Machine-to-machine clients use
//! the `client_credentials` grant; every other client type goes through the
//! browser and a one-shot loopback redirect listener.

mod audience;
mod authorization;
mod browser;
mod callback;
pub mod client_credentials;
mod errors;
mod pkce;
mod service;
mod token;

pub use audience::*;
pub use authorization::*;
pub use browser::*;
pub use callback::*;
pub use errors::*;
pub use pkce::*;
pub use service::*;
pub use token::*;

/// Token endpoint path, relative to the tenant base URL.
pub const TOKEN_PATH: &str = "/oauth/token";

/// Authorization endpoint path, relative to the tenant base URL.
pub const AUTHORIZE_PATH: &str = "/authorize";
