//! Signed-in user context.
//!
//! A [`Session`] is built once at start-up and passed to whatever needs it.
//! It round-trips through a small set of persisted key-value flags. The
//! flags are a navigation hint only: an authenticated flag says nothing
//! about whether the backend still honours the user's tokens.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FLAG_AUTHENTICATED: &str = "isAuthenticated";
pub const FLAG_ROLE: &str = "userRole";
pub const FLAG_EMAIL: &str = "userEmail";
pub const FLAG_LOGIN_TIME: &str = "loginTime";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Rep,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Rep => "rep",
            Role::Admin => "admin",
        }
    }

    /// Whether the role sees the manager dashboard.
    pub fn can_view_dashboard(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "rep" | "sales_rep" => Ok(Role::Rep),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub login_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(role: Role, email: impl Into<String>, login_at: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            role: Some(role),
            email: Some(email.into()),
            login_at: Some(login_at),
        }
    }

    pub fn sign_out(&mut self) {
        *self = Self::anonymous();
    }

    /// Skip the login screen for a session that already signed in.
    pub fn should_skip_login(&self) -> bool {
        self.authenticated && self.role.is_some()
    }

    /// Where a signed-in user lands.
    pub fn landing_path(&self) -> &'static str {
        match self.role {
            Some(role) if self.authenticated && role.can_view_dashboard() => "/dashboard",
            Some(_) if self.authenticated => "/contacts",
            _ => "/login",
        }
    }

    pub fn to_flags(&self) -> BTreeMap<String, String> {
        let mut flags = BTreeMap::new();
        flags.insert(FLAG_AUTHENTICATED.to_string(), self.authenticated.to_string());
        if let Some(role) = self.role {
            flags.insert(FLAG_ROLE.to_string(), role.as_str().to_string());
        }
        if let Some(email) = &self.email {
            flags.insert(FLAG_EMAIL.to_string(), email.clone());
        }
        if let Some(at) = self.login_at {
            flags.insert(FLAG_LOGIN_TIME.to_string(), at.to_rfc3339());
        }
        flags
    }

    /// Rebuild from persisted flags; malformed values are dropped.
    pub fn from_flags(flags: &BTreeMap<String, String>) -> Self {
        Self {
            authenticated: flags
                .get(FLAG_AUTHENTICATED)
                .is_some_and(|v| v == "true"),
            role: flags.get(FLAG_ROLE).and_then(|v| v.parse().ok()),
            email: flags.get(FLAG_EMAIL).filter(|v| !v.is_empty()).cloned(),
            login_at: flags
                .get(FLAG_LOGIN_TIME)
                .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_flags_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let session = Session::signed_in(Role::Manager, "boss@roofco.com", at);
        let flags = session.to_flags();
        assert_eq!(flags.get(FLAG_AUTHENTICATED).map(String::as_str), Some("true"));
        assert_eq!(flags.get(FLAG_ROLE).map(String::as_str), Some("manager"));
        assert_eq!(Session::from_flags(&flags), session);
    }

    #[test]
    fn test_skip_login_and_landing() {
        let at = Utc::now();
        let manager = Session::signed_in(Role::Manager, "m@x.com", at);
        assert!(manager.should_skip_login());
        assert_eq!(manager.landing_path(), "/dashboard");

        let rep = Session::signed_in(Role::Rep, "r@x.com", at);
        assert_eq!(rep.landing_path(), "/contacts");

        let mut signed_out = rep.clone();
        signed_out.sign_out();
        assert!(!signed_out.should_skip_login());
        assert_eq!(signed_out.landing_path(), "/login");
    }

    #[test]
    fn test_malformed_flags_are_ignored() {
        let mut flags = BTreeMap::new();
        flags.insert(FLAG_AUTHENTICATED.to_string(), "yes".to_string());
        flags.insert(FLAG_ROLE.to_string(), "intern".to_string());
        flags.insert(FLAG_LOGIN_TIME.to_string(), "yesterday".to_string());

        let session = Session::from_flags(&flags);
        assert_eq!(session, Session::anonymous());
    }
}
