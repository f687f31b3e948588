mod credential;
mod manager;

pub use credential::{AppIdentity, Credential, TokenKind};
pub use manager::CredentialManager;
