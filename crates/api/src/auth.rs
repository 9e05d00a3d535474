//! Static-key authorization for the admin and export surfaces.
//!
//! The external contract is a shared secret in a request header, not a
//! session or token protocol. Key material and comparison live here, behind
//! the [`AdminGate`] interface; handlers only name the extractor they need.

use axum::{extract::FromRequestParts, http::request::Parts};
use munreg_common::config::AdminConfig;
use munreg_common::{AppError, AppResult};

use crate::state::AppState;

/// Header carrying the admin key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the export key.
pub const EXPORT_KEY_HEADER: &str = "x-export-key";

/// Holds the configured keys and answers authorization checks.
///
/// Keys are trimmed at construction and presented values are trimmed
/// before comparison; surrounding whitespace from copy-pasted environment
/// values never causes a lockout.
#[derive(Clone)]
pub struct AdminGate {
    api_key: String,
    export_key: String,
}

impl AdminGate {
    /// Create a gate from the admin configuration.
    #[must_use]
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            api_key: config.api_key.trim().to_string(),
            export_key: config.export_key.trim().to_string(),
        }
    }

    /// Authorize access to the admin list/verify surface.
    pub fn authorize_admin(&self, presented: Option<&str>) -> AppResult<()> {
        Self::check(&self.api_key, presented)
    }

    /// Authorize access to the export surface.
    pub fn authorize_export(&self, presented: Option<&str>) -> AppResult<()> {
        Self::check(&self.export_key, presented)
    }

    fn check(expected: &str, presented: Option<&str>) -> AppResult<()> {
        // An empty configured key locks the surface rather than opening it.
        if expected.is_empty() {
            return Err(AppError::Unauthorized);
        }

        match presented.map(str::trim) {
            Some(presented) if presented == expected => Ok(()),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// Extractor asserting a valid admin key header.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

impl FromRequestParts<AppState> for AdminKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        state.gate.authorize_admin(presented)?;
        Ok(Self)
    }
}

/// Extractor asserting a valid export key header.
#[derive(Debug, Clone, Copy)]
pub struct ExportKey;

impl FromRequestParts<AppState> for ExportKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(EXPORT_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        state.gate.authorize_export(presented)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        AdminGate::new(&AdminConfig {
            api_key: "  admin-secret  ".to_string(),
            export_key: "export-secret".to_string(),
        })
    }

    #[test]
    fn test_admin_key_accepted_after_trimming() {
        let gate = gate();
        assert!(gate.authorize_admin(Some("admin-secret")).is_ok());
        assert!(gate.authorize_admin(Some(" admin-secret ")).is_ok());
    }

    #[test]
    fn test_wrong_or_missing_key_rejected() {
        let gate = gate();
        assert!(gate.authorize_admin(Some("nope")).is_err());
        assert!(gate.authorize_admin(None).is_err());
        assert!(gate.authorize_export(Some("admin-secret")).is_err());
    }

    #[test]
    fn test_empty_configured_key_locks_surface() {
        let gate = AdminGate::new(&AdminConfig {
            api_key: String::new(),
            export_key: "export-secret".to_string(),
        });
        assert!(gate.authorize_admin(Some("")).is_err());
        assert!(gate.authorize_admin(None).is_err());
    }
}
