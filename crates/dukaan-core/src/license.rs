//! # License Claims
//!
//! Pure license model: what a decoded license says and which business modes
//! it permits. Reading, decrypting and persisting the license blob is the
//! server's job; this module only evaluates claims.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Mode;

/// Feature flag enabling restaurant mode.
pub const FEATURE_RESTAURANT: &str = "restaurant";
/// Feature flag enabling grocery/retail mode.
pub const FEATURE_RETAIL: &str = "retail";

// =============================================================================
// Claims
// =============================================================================

/// Raw claims carried inside the signed license token.
///
/// `nbf`/`exp` are standard JWT timestamps: activation and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseClaims {
    /// Licensee display name.
    pub customer: String,
    /// Enabled feature flags ("restaurant", "retail").
    pub features: Vec<String>,
    /// Activation date (not-before), Unix seconds.
    pub nbf: i64,
    /// Expiry date, Unix seconds.
    pub exp: i64,
}

impl LicenseClaims {
    /// Evaluates the validity window against `now`.
    pub fn evaluate(self, now: DateTime<Utc>) -> LicenseInfo {
        let activation = Utc
            .timestamp_opt(self.nbf, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());
        let expiry = Utc
            .timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());

        let status = if now < activation {
            LicenseStatus::NotYetActive
        } else if now > expiry {
            LicenseStatus::Expired
        } else {
            LicenseStatus::Active
        };

        LicenseInfo {
            customer: self.customer,
            features: self.features,
            activation,
            expiry,
            status,
        }
    }
}

// =============================================================================
// Evaluated License
// =============================================================================

/// Validity state of an installed license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    Active,
    NotYetActive,
    Expired,
}

/// A decoded, evaluated license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub customer: String,
    pub features: Vec<String>,
    pub activation: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
    pub status: LicenseStatus,
}

impl LicenseInfo {
    pub fn is_active(&self) -> bool {
        self.status == LicenseStatus::Active
    }

    /// Whether the license covers `mode`.
    ///
    /// Only meaningful for an active license; inactive licenses gate nothing.
    pub fn permits(&self, mode: Mode) -> bool {
        self.features.iter().any(|f| f == mode.required_feature())
    }

    /// Applies license enforcement to the persisted mode.
    ///
    /// If the current mode is not covered but the other one is, the other
    /// mode wins. Idempotent: correcting twice changes nothing further.
    pub fn corrected_mode(&self, current: Mode) -> Mode {
        if !self.is_active() {
            return current;
        }
        if self.permits(current) {
            return current;
        }
        if self.permits(current.other()) {
            return current.other();
        }
        // License covers neither mode; leave the flag alone.
        current
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(features: &[&str], nbf: i64, exp: i64) -> LicenseClaims {
        LicenseClaims {
            customer: "Sharma General Stores".to_string(),
            features: features.iter().map(|s| s.to_string()).collect(),
            nbf,
            exp,
        }
    }

    fn active(features: &[&str]) -> LicenseInfo {
        let now = Utc::now();
        claims(
            features,
            (now - Duration::days(1)).timestamp(),
            (now + Duration::days(30)).timestamp(),
        )
        .evaluate(now)
    }

    #[test]
    fn test_status_window() {
        let now = Utc::now();
        let future = claims(
            &[FEATURE_RETAIL],
            (now + Duration::days(1)).timestamp(),
            (now + Duration::days(30)).timestamp(),
        )
        .evaluate(now);
        assert_eq!(future.status, LicenseStatus::NotYetActive);

        let past = claims(
            &[FEATURE_RETAIL],
            (now - Duration::days(30)).timestamp(),
            (now - Duration::days(1)).timestamp(),
        )
        .evaluate(now);
        assert_eq!(past.status, LicenseStatus::Expired);

        assert!(active(&[FEATURE_RETAIL]).is_active());
    }

    #[test]
    fn test_retail_only_forces_grocery() {
        let license = active(&[FEATURE_RETAIL]);
        assert_eq!(license.corrected_mode(Mode::Restaurant), Mode::Grocery);
        // Idempotent: the corrected mode is stable.
        assert_eq!(license.corrected_mode(Mode::Grocery), Mode::Grocery);
    }

    #[test]
    fn test_restaurant_only_forces_restaurant() {
        let license = active(&[FEATURE_RESTAURANT]);
        assert_eq!(license.corrected_mode(Mode::Grocery), Mode::Restaurant);
        assert_eq!(license.corrected_mode(Mode::Restaurant), Mode::Restaurant);
    }

    #[test]
    fn test_both_features_change_nothing() {
        let license = active(&[FEATURE_RESTAURANT, FEATURE_RETAIL]);
        assert_eq!(license.corrected_mode(Mode::Restaurant), Mode::Restaurant);
        assert_eq!(license.corrected_mode(Mode::Grocery), Mode::Grocery);
    }

    #[test]
    fn test_inactive_license_gates_nothing() {
        let now = Utc::now();
        let expired = claims(
            &[FEATURE_RETAIL],
            (now - Duration::days(60)).timestamp(),
            (now - Duration::days(1)).timestamp(),
        )
        .evaluate(now);
        assert_eq!(expired.corrected_mode(Mode::Restaurant), Mode::Restaurant);
    }

    #[test]
    fn test_empty_features_change_nothing() {
        let license = active(&[]);
        assert_eq!(license.corrected_mode(Mode::Restaurant), Mode::Restaurant);
    }
}
