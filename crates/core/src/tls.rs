//! Transport security policy for the database connection.
//!
//! The mode is either given explicitly or derived from the deployment
//! environment. An explicit mode overrides any `sslmode` in the database
//! URL; a derived one only applies when the URL names none. The derived
//! fallback encrypts in production without verifying the server
//! certificate and disables TLS everywhere else.

use std::str::FromStr;

use crate::error::CoreError;

/// Deployment environment name that turns on TLS when no mode is given.
pub const PRODUCTION_ENV: &str = "production";

/// TLS modes accepted in configuration, mirroring libpq `sslmode` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    Disable,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl TlsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Prefer => "prefer",
            Self::Require => "require",
            Self::VerifyCa => "verify-ca",
            Self::VerifyFull => "verify-full",
        }
    }

    /// Fallback mode for a deployment environment name.
    pub fn for_environment(app_env: &str) -> Self {
        if app_env.trim().eq_ignore_ascii_case(PRODUCTION_ENV) {
            Self::Require
        } else {
            Self::Disable
        }
    }
}

/// Where the TLS mode came from, which decides whether it may override
/// an `sslmode` already present in the database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Configured directly; always wins.
    Explicit(TlsMode),
    /// Derived from the deployment environment; yields to the URL.
    Fallback(TlsMode),
}

impl TlsPolicy {
    /// Use the explicit mode when one is configured, else derive a
    /// fallback from the environment name.
    pub fn resolve(explicit: Option<&str>, app_env: &str) -> Result<Self, CoreError> {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Ok(Self::Explicit(raw.parse()?)),
            None => Ok(Self::Fallback(TlsMode::for_environment(app_env))),
        }
    }

    pub fn mode(&self) -> TlsMode {
        match self {
            Self::Explicit(mode) | Self::Fallback(mode) => *mode,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

impl FromStr for TlsMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-ca" | "verify_ca" => Ok(Self::VerifyCa),
            "verify-full" | "verify_full" => Ok(Self::VerifyFull),
            other => Err(CoreError::Validation(format!(
                "Unknown TLS mode '{other}'; expected one of disable, prefer, require, verify-ca, verify-full"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_requires_tls() {
        assert_eq!(TlsMode::for_environment("production"), TlsMode::Require);
        assert_eq!(TlsMode::for_environment(" Production "), TlsMode::Require);
    }

    #[test]
    fn other_environments_disable_tls() {
        assert_eq!(TlsMode::for_environment("development"), TlsMode::Disable);
        assert_eq!(TlsMode::for_environment("staging"), TlsMode::Disable);
        assert_eq!(TlsMode::for_environment(""), TlsMode::Disable);
    }

    #[test]
    fn explicit_mode_wins_over_environment() {
        let policy = TlsPolicy::resolve(Some("verify-full"), "development").unwrap();
        assert_eq!(policy, TlsPolicy::Explicit(TlsMode::VerifyFull));

        let policy = TlsPolicy::resolve(Some("disable"), "production").unwrap();
        assert_eq!(policy, TlsPolicy::Explicit(TlsMode::Disable));
        assert!(policy.is_explicit());
    }

    #[test]
    fn missing_mode_is_a_fallback() {
        let policy = TlsPolicy::resolve(None, "production").unwrap();
        assert_eq!(policy, TlsPolicy::Fallback(TlsMode::Require));
        assert!(!policy.is_explicit());
        assert_eq!(policy.mode(), TlsMode::Require);
    }

    #[test]
    fn blank_explicit_mode_falls_back() {
        let policy = TlsPolicy::resolve(Some("  "), "production").unwrap();
        assert_eq!(policy, TlsPolicy::Fallback(TlsMode::Require));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = TlsPolicy::resolve(Some("sometimes"), "production").unwrap_err();
        assert!(err.to_string().contains("sometimes"));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("VERIFY_CA".parse::<TlsMode>().unwrap(), TlsMode::VerifyCa);
    }
}
