//! Authentication for the model API.
//!
//! Every request carries a short-lived bearer token minted locally from the
//! `id.secret` API key; nothing is fetched from the network.

pub mod token;

pub use token::{mint_token, TokenClaims, DEFAULT_TOKEN_TTL};
