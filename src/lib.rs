//! authtool
//!
//! Operator tooling for identity-provider tenants: a local credential store,
//! an OAuth2 token broker, a paginated client directory fetcher and a live
//! fuzzy-search console over that directory.

pub mod broker;
pub mod config;
pub mod directory;
pub mod prompt;
pub mod search;
pub mod session;
pub mod store;
