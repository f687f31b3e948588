//! Client for the Feishu / Lark cloud document open API
//!
//! A [`Client`] owns one tenant access token and shares it between every
//! task holding a clone. The token is fetched on first use, refreshed shortly
//! before it expires, and concurrent callers never trigger more than one
//! refresh at a time.
//!
//! Failures come back as [`Error`], which keeps transport problems, token
//! issuance problems and service-reported errors apart. Nothing is retried
//! automatically; see [`Error::is_token_expired`] and
//! [`Client::invalidate_token`] for building a retry on top.

pub mod api;
pub mod auth;
mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod time;

#[cfg(test)]
pub(crate) mod testutil;

pub use auth::{AppIdentity, CredentialManager, TokenKind};
pub use client::{Client, Response};
pub use config::ClientConfig;
pub use error::{ApiError, CredentialError, Error, ErrorKind, Result, TransportError};
