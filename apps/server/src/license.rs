//! # License Manager
//!
//! Loads, verifies, activates, and removes the installed license blob.
//!
//! The blob is an HS256-signed token. The signature proves it came from the
//! vendor; the validity window (activation/expiry) is evaluated here on
//! every refresh so a license can expire while the server is running. An
//! expired or not-yet-active license is still reported (with its status) but
//! gates nothing.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use dukaan_core::{LicenseClaims, LicenseInfo};

use crate::error::ApiError;

/// Shared secret for license verification. Must match the issuing tool.
const LICENSE_SECRET: &[u8] = b"dukaan_license_secret_key_2026";

/// Manages the on-disk license blob and its decoded state.
#[derive(Debug)]
pub struct LicenseManager {
    path: PathBuf,
    state: RwLock<Option<LicenseInfo>>,
}

impl LicenseManager {
    pub fn new(path: PathBuf) -> Self {
        LicenseManager {
            path,
            state: RwLock::new(None),
        }
    }

    /// Re-reads the license file and re-evaluates the validity window.
    /// Returns the current license, if any.
    pub async fn refresh(&self) -> Option<LicenseInfo> {
        let info = match tokio::fs::read_to_string(&self.path).await {
            Ok(token) => match decode_license(token.trim()) {
                Ok(claims) => Some(claims.evaluate(Utc::now())),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e.message, "Invalid license file");
                    None
                }
            },
            Err(_) => {
                debug!(path = %self.path.display(), "No license file");
                None
            }
        };

        *self.state.write().await = info.clone();
        info
    }

    /// The last refreshed license, if any.
    pub async fn info(&self) -> Option<LicenseInfo> {
        self.state.read().await.clone()
    }

    /// Verifies a license key and persists it as the installed license.
    ///
    /// The key must carry a valid signature; an out-of-window key is still
    /// installed (it may become active later) but its status is returned.
    pub async fn activate(&self, token: &str) -> Result<LicenseInfo, ApiError> {
        let claims = decode_license(token.trim())?;

        tokio::fs::write(&self.path, token.trim())
            .await
            .map_err(|e| ApiError::internal(format!("Failed to save license: {e}")))?;

        let info = claims.evaluate(Utc::now());
        *self.state.write().await = Some(info.clone());
        Ok(info)
    }

    /// Removes the installed license.
    pub async fn remove(&self) -> Result<(), ApiError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ApiError::internal(format!("Failed to remove license: {e}"))),
        }

        *self.state.write().await = None;
        Ok(())
    }
}

/// Verifies the signature and extracts the claims.
///
/// The validity window is deliberately NOT enforced by the decoder: the
/// caller evaluates it against the clock, so NOT_YET_ACTIVE and EXPIRED can
/// be reported as statuses instead of opaque failures.
fn decode_license(token: &str) -> Result<LicenseClaims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = HashSet::new();

    decode::<LicenseClaims>(token, &DecodingKey::from_secret(LICENSE_SECRET), &validation)
        .map(|data| data.claims)
        .map_err(|_| ApiError::license("Invalid license key format"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dukaan_core::LicenseStatus;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(features: &[&str], nbf_offset_days: i64, exp_offset_days: i64) -> String {
        let now = Utc::now();
        let claims = LicenseClaims {
            customer: "Sharma General Stores".to_string(),
            features: features.iter().map(|s| s.to_string()).collect(),
            nbf: (now + Duration::days(nbf_offset_days)).timestamp(),
            exp: (now + Duration::days(exp_offset_days)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(LICENSE_SECRET),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_activate_and_refresh_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = LicenseManager::new(dir.path().join("license.lic"));

        assert!(manager.refresh().await.is_none());

        let info = manager
            .activate(&token(&["restaurant", "retail"], -1, 30))
            .await
            .unwrap();
        assert_eq!(info.status, LicenseStatus::Active);

        // A fresh manager over the same path picks the license up from disk.
        let reloaded = LicenseManager::new(dir.path().join("license.lic"));
        let info = reloaded.refresh().await.expect("license on disk");
        assert!(info.is_active());
        assert_eq!(info.features, vec!["restaurant", "retail"]);
    }

    #[tokio::test]
    async fn test_garbage_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manager = LicenseManager::new(dir.path().join("license.lic"));

        let err = manager.activate("not-a-license").await.unwrap_err();
        assert!(err.message.contains("Invalid license"));
        assert!(manager.info().await.is_none());
    }

    #[tokio::test]
    async fn test_expired_license_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let manager = LicenseManager::new(dir.path().join("license.lic"));

        let info = manager.activate(&token(&["retail"], -60, -1)).await.unwrap();
        assert_eq!(info.status, LicenseStatus::Expired);
        assert!(!info.is_active());
    }

    #[tokio::test]
    async fn test_remove_clears_state_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("license.lic");
        let manager = LicenseManager::new(path.clone());

        manager.activate(&token(&["retail"], -1, 30)).await.unwrap();
        assert!(path.exists());

        manager.remove().await.unwrap();
        assert!(!path.exists());
        assert!(manager.info().await.is_none());

        // Removing twice is fine.
        manager.remove().await.unwrap();
    }
}
