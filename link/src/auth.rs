//! Authentication for engine requests.
//!
//! ksqlDB servers secured with HTTP Basic (or a bearer token behind a proxy)
//! expect the `Authorization` header on every request, including the
//! long-lived push query stream.

use base64::{engine::general_purpose, Engine as _};
use std::fmt;

/// Credentials attached to every request.
///
/// # Examples
///
/// ```rust
/// use ksql_link::AuthProvider;
///
/// let auth = AuthProvider::basic_auth("ksql-user", "s3cret");
/// assert!(auth.is_authenticated());
///
/// let none = AuthProvider::none();
/// assert_eq!(none.authorization_header(), None);
/// ```
#[derive(Clone, Default)]
pub enum AuthProvider {
    /// HTTP Basic Auth (RFC 7617)
    Basic { username: String, password: String },

    /// `Authorization: Bearer <token>`
    Bearer(String),

    #[default]
    None,
}

impl AuthProvider {
    pub fn basic_auth(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer_token(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    pub fn none() -> Self {
        Self::None
    }

    /// Value of the `Authorization` header, if any.
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Self::Basic { username, password } => {
                let encoded = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", encoded))
            },
            Self::Bearer(token) => Some(format!("Bearer {}", token)),
            Self::None => None,
        }
    }

    /// Attach the `Authorization` header to a request builder.
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.authorization_header() {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

// Keep secrets out of debug logs
impl fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => {
                f.debug_struct("Basic").field("username", username).finish_non_exhaustive()
            },
            Self::Bearer(_) => f.write_str("Bearer(..)"),
            Self::None => f.write_str("None"),
        }
    }
}
