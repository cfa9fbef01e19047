//! Resolving auth redirect links.
//!
//! Magic-link sign-in, sign-up confirmation and password recovery all come
//! back as a redirect carrying tokens (or an error) in the query string or
//! fragment. This module turns those parameters into an [`AuthFlow`] state.
//! Expired and malformed links get their own states so the page can offer a
//! fresh link instead of a generic error.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLinkType {
    Recovery,
    Magiclink,
    Signup,
    Confirmation,
}

impl AuthLinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthLinkType::Recovery => "recovery",
            AuthLinkType::Magiclink => "magiclink",
            AuthLinkType::Signup => "signup",
            AuthLinkType::Confirmation => "confirmation",
        }
    }
}

impl FromStr for AuthLinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recovery" => Ok(AuthLinkType::Recovery),
            "magiclink" => Ok(AuthLinkType::Magiclink),
            "signup" => Ok(AuthLinkType::Signup),
            "confirmation" => Ok(AuthLinkType::Confirmation),
            other => Err(format!("unknown link type: {}", other)),
        }
    }
}

impl fmt::Display for AuthLinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session tokens carried by a valid link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Raw redirect parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub link_type: Option<String>,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse a full redirect URL, or a bare `?query` / `#fragment`.
    ///
    /// Parameters from both the query and the fragment are read; the
    /// fragment wins when a key appears in both.
    pub fn parse(raw: &str) -> Self {
        let (query, fragment) = split_url(raw);
        let mut params = Self::default();
        for part in [query, fragment].into_iter().flatten() {
            params.absorb(part);
        }
        params
    }

    /// Build from already-decoded pairs (e.g. an HTTP framework's query map).
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.set(key.as_ref(), value.into());
        }
        params
    }

    fn absorb(&mut self, encoded: &str) {
        for (key, value) in form_urlencoded::parse(encoded.as_bytes()) {
            self.set(&key, value.into_owned());
        }
    }

    fn set(&mut self, key: &str, value: String) {
        if value.is_empty() {
            return;
        }
        let slot = match key {
            "access_token" => &mut self.access_token,
            "refresh_token" => &mut self.refresh_token,
            "token_type" => &mut self.token_type,
            "type" => &mut self.link_type,
            "error" => &mut self.error,
            "error_code" => &mut self.error_code,
            "error_description" => &mut self.error_description,
            _ => return,
        };
        *slot = Some(value);
    }
}

fn split_url(raw: &str) -> (Option<&str>, Option<&str>) {
    let raw = raw.trim();
    let (before_fragment, fragment) = match raw.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (raw, None),
    };
    let query = match before_fragment.split_once('?') {
        Some((_, q)) => Some(q),
        None if !before_fragment.contains("://") && !before_fragment.starts_with('/') => {
            Some(before_fragment)
        }
        None => None,
    };
    (query, fragment)
}

/// Where an auth-link page stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthFlow {
    /// Parameters not yet inspected.
    #[default]
    Verifying,
    /// Link accepted; tokens can be exchanged for a session.
    Ready { kind: AuthLinkType, tokens: AuthTokens },
    /// Link was valid once but has expired.
    LinkExpired { description: String },
    /// Link is missing parameters or of the wrong kind.
    LinkInvalid { reason: String },
    /// The provider reported some other error.
    Failed { message: String },
}

impl AuthFlow {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuthFlow::Verifying)
    }

    /// Whether the page should offer to send a new link.
    pub fn offers_resend(&self) -> bool {
        matches!(self, AuthFlow::LinkExpired { .. } | AuthFlow::LinkInvalid { .. })
    }
}

/// Decide the state of an auth-link page.
///
/// `expected` lists the link kinds the page accepts; an empty slice
/// accepts any kind.
pub fn resolve(params: &CallbackParams, expected: &[AuthLinkType]) -> AuthFlow {
    if let Some(error) = &params.error {
        let description = params
            .error_description
            .clone()
            .unwrap_or_else(|| error.clone());
        let code = params.error_code.as_deref().unwrap_or("");
        let lowered = description.to_lowercase();

        if code == "otp_expired" || lowered.contains("expired") {
            return AuthFlow::LinkExpired { description };
        }
        if lowered.contains("invalid") {
            return AuthFlow::LinkInvalid { reason: description };
        }
        return AuthFlow::Failed { message: description };
    }

    let (access_token, refresh_token) = match (&params.access_token, &params.refresh_token) {
        (Some(access), Some(refresh)) => (access.clone(), refresh.clone()),
        _ => {
            return AuthFlow::LinkInvalid {
                reason: "link is missing its session tokens".to_string(),
            }
        }
    };

    let kind = match params.link_type.as_deref().map(str::parse::<AuthLinkType>) {
        Some(Ok(kind)) => kind,
        Some(Err(reason)) => return AuthFlow::LinkInvalid { reason },
        None => {
            return AuthFlow::LinkInvalid {
                reason: "link type is missing".to_string(),
            }
        }
    };

    if !expected.is_empty() && !expected.contains(&kind) {
        return AuthFlow::LinkInvalid {
            reason: format!("unexpected {} link", kind),
        };
    }

    AuthFlow::Ready {
        kind,
        tokens: AuthTokens {
            access_token,
            refresh_token,
            token_type: params
                .token_type
                .clone()
                .unwrap_or_else(|| "bearer".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_link_from_fragment() {
        let params = CallbackParams::parse(
            "https://crm.example.com/reset-password#access_token=abc&refresh_token=def&token_type=bearer&type=recovery",
        );
        let flow = resolve(&params, &[AuthLinkType::Recovery]);
        match flow {
            AuthFlow::Ready { kind, tokens } => {
                assert_eq!(kind, AuthLinkType::Recovery);
                assert_eq!(tokens.access_token, "abc");
                assert_eq!(tokens.refresh_token, "def");
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_bare_query_string() {
        let params = CallbackParams::parse("?access_token=a&refresh_token=r&type=magiclink");
        assert_eq!(params.link_type.as_deref(), Some("magiclink"));
        assert!(matches!(resolve(&params, &[]), AuthFlow::Ready { .. }));
    }

    #[test]
    fn test_expired_link_is_distinct() {
        let params = CallbackParams::parse(
            "/auth/callback#error=access_denied&error_code=otp_expired&error_description=Email+link+is+invalid+or+has+expired",
        );
        let flow = resolve(&params, &[]);
        assert_eq!(
            flow,
            AuthFlow::LinkExpired {
                description: "Email link is invalid or has expired".to_string()
            }
        );
        assert!(flow.offers_resend());
    }

    #[test]
    fn test_missing_tokens_is_invalid() {
        let params = CallbackParams::parse("?type=signup");
        let flow = resolve(&params, &[]);
        assert!(matches!(flow, AuthFlow::LinkInvalid { .. }));
    }

    #[test]
    fn test_wrong_link_type_is_invalid() {
        let params = CallbackParams::parse("#access_token=a&refresh_token=r&type=signup");
        let flow = resolve(&params, &[AuthLinkType::Recovery]);
        assert_eq!(
            flow,
            AuthFlow::LinkInvalid {
                reason: "unexpected signup link".to_string()
            }
        );
    }

    #[test]
    fn test_other_provider_errors_fail() {
        let params = CallbackParams::from_pairs([("error", "server_error")]);
        let flow = resolve(&params, &[]);
        assert_eq!(
            flow,
            AuthFlow::Failed {
                message: "server_error".to_string()
            }
        );
        assert!(!flow.offers_resend());
        assert!(flow.is_terminal());
        assert!(!AuthFlow::default().is_terminal());
    }
}
