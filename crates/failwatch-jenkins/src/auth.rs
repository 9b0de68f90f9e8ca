//! Credentials for the Jenkins API.

/// How requests authenticate against Jenkins.
///
/// Resolved once at startup; the client never inspects raw environment
/// variables.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// API token, sent as HTTP basic `user:token`. Jenkins only accepts
    /// API tokens paired with the owning user name.
    Token { user: String, token: String },

    /// Plain user name and password over HTTP basic.
    Basic { user: String, password: String },

    /// No credentials.
    Anonymous,
}

impl AuthMethod {
    pub(crate) fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            AuthMethod::Token { user, token } => req.basic_auth(user, Some(token)),
            AuthMethod::Basic { user, password } => req.basic_auth(user, Some(password)),
            AuthMethod::Anonymous => req,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthMethod::Token { .. } => "token",
            AuthMethod::Basic { .. } => "basic",
            AuthMethod::Anonymous => "anonymous",
        }
    }
}

// Secrets stay out of logs and debug output.
impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Token { user, .. } => f
                .debug_struct("Token")
                .field("user", user)
                .field("token", &"<redacted>")
                .finish(),
            AuthMethod::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
            AuthMethod::Anonymous => f.write_str("Anonymous"),
        }
    }
}
