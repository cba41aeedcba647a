//! Credential check and bearer token issuance.
//!
//! Exactly one username/password pair and one token are valid for the
//! lifetime of the process. Both are held in configuration.

use subtle::ConstantTimeEq;

use items_types::{AppError, Principal, TokenResponse};

/// The single valid credential pair, the token it is exchanged for, and the
/// subject that token authenticates as.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub token: String,
    pub subject: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            password: "password".into(),
            token: "secret-token".into(),
            subject: "user1".into(),
        }
    }
}

/// Validates bearer tokens and issues the token for the configured user.
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    credentials: Credentials,
}

impl AuthGate {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Exchanges the configured username/password for the bearer token.
    pub fn issue_token(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        let matches = ct_str_eq(username, &self.credentials.username)
            & ct_str_eq(password, &self.credentials.password);

        if bool::from(matches) {
            Ok(TokenResponse::bearer(self.credentials.token.clone()))
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    /// Resolves a bearer token to the principal it stands for.
    pub fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        if bool::from(ct_str_eq(token, &self.credentials.token)) {
            Ok(Principal::new(self.credentials.subject.clone()))
        } else {
            Err(AppError::Unauthorized(
                "Invalid authentication credentials".into(),
            ))
        }
    }
}

fn ct_str_eq(a: &str, b: &str) -> subtle::Choice {
    a.as_bytes().ct_eq(b.as_bytes())
}
