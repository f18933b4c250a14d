//! # Mode Registry
//!
//! Single source of truth for which business mode is active, and owner of
//! the active store handle.
//!
//! ## Fencing Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 RwLock<ActiveStore> (tokio, owned guards)           │
//! │                                                                     │
//! │  Request handlers:   registry.store().await  → read guard, held     │
//! │                      for the whole request. A request that started  │
//! │                      against restaurant.db finishes against it.     │
//! │                                                                     │
//! │  Mode switch:        write lock → waits for every in-flight         │
//! │                      request to drain, persists the flag, opens     │
//! │                      the new store, closes the old pool, swaps.     │
//! │                                                                     │
//! │  Concurrent switches serialize on the same write lock; a swap can   │
//! │  never land mid-transaction.                                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License Enforcement
//! Reading the current mode may silently correct it: if an active license
//! covers only one mode and the persisted flag points at the other, the
//! registry switches to the permitted mode and persists the correction.
//! The correction is idempotent.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{OwnedRwLockReadGuard, RwLock};
use tracing::info;

use dukaan_core::{CoreError, LicenseInfo, Mode, Role};

use crate::error::DbResult;
use crate::master::MasterStore;
use crate::pool::Store;

/// The currently active store together with the mode it serves.
#[derive(Debug)]
pub struct ActiveStore {
    mode: Mode,
    store: Store,
}

/// Read guard over the active store, held by a request for its lifetime.
pub type StoreGuard = OwnedRwLockReadGuard<ActiveStore, Store>;

/// Process-wide registry of the active business mode.
#[derive(Debug)]
pub struct ModeRegistry {
    master: MasterStore,
    data_dir: PathBuf,
    active: Arc<RwLock<ActiveStore>>,
}

impl ModeRegistry {
    /// Opens the master store under `data_dir`, reads the persisted mode
    /// (defaulting to RESTAURANT), and opens the matching store.
    pub async fn open(data_dir: impl Into<PathBuf>) -> DbResult<Self> {
        let data_dir = data_dir.into();
        let master = MasterStore::open(data_dir.join("master.db")).await?;
        let mode = master.mode().await?;
        let store = Store::open_mode(&data_dir, mode).await?;

        info!(%mode, "Mode registry initialized");

        Ok(ModeRegistry {
            master,
            data_dir,
            active: Arc::new(RwLock::new(ActiveStore { mode, store })),
        })
    }

    /// The mode currently being served (no license enforcement).
    pub async fn mode(&self) -> Mode {
        self.active.read().await.mode
    }

    /// The mode currently being served, after license enforcement.
    ///
    /// If an active license does not permit the persisted mode but permits
    /// the other one, the registry switches and persists the correction
    /// before answering. Calling this twice in a row yields no further
    /// change.
    pub async fn current_mode(&self, license: Option<&LicenseInfo>) -> DbResult<Mode> {
        let current = self.mode().await;

        if let Some(license) = license {
            let corrected = license.corrected_mode(current);
            if corrected != current {
                info!(from = %current, to = %corrected, "License enforcement: correcting mode");
                self.switch(corrected).await?;
                return Ok(corrected);
            }
        }

        Ok(current)
    }

    /// Switches the active business mode. SUPER_ADMIN only.
    ///
    /// Fails with `Unauthorized` for lesser roles and `ModeNotLicensed`
    /// when an active license does not cover the requested mode. On success
    /// the new mode is persisted and the active store swapped.
    pub async fn set_mode(
        &self,
        mode: Mode,
        role: Role,
        license: Option<&LicenseInfo>,
    ) -> DbResult<Mode> {
        if !role.is_super_admin() {
            return Err(CoreError::Unauthorized {
                required: Role::SuperAdmin,
            }
            .into());
        }

        if let Some(license) = license {
            if license.is_active() && !license.permits(mode) {
                return Err(CoreError::ModeNotLicensed { mode }.into());
            }
        }

        self.switch(mode).await?;
        Ok(mode)
    }

    /// Acquires the active store for the duration of a request.
    ///
    /// Hold the guard until the request is done: it is what fences the
    /// store swap away from in-flight transactions.
    pub async fn store(&self) -> StoreGuard {
        OwnedRwLockReadGuard::map(self.active.clone().read_owned().await, |a| &a.store)
    }

    /// The data directory this registry manages.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Performs the actual swap. Serialized by the write lock; waits for
    /// in-flight requests (read guards) to drain first.
    async fn switch(&self, mode: Mode) -> DbResult<()> {
        let mut active = self.active.clone().write_owned().await;

        if active.mode == mode {
            return Ok(());
        }

        // Open the replacement before touching anything, so a failed open
        // leaves the current store serving.
        let store = Store::open_mode(&self.data_dir, mode).await?;
        self.master.set_mode(mode).await?;

        let old = std::mem::replace(&mut *active, ActiveStore { mode, store });
        old.store.close().await;

        info!(%mode, "Active store switched");
        Ok(())
    }

    /// Closes everything. Only used on process shutdown.
    pub async fn close(&self) {
        self.active.read().await.store.close().await;
        self.master.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dukaan_core::LicenseClaims;

    use crate::repository::item::NewItem;

    async fn registry() -> (tempfile::TempDir, ModeRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModeRegistry::open(dir.path()).await.unwrap();
        (dir, registry)
    }

    fn license(features: &[&str]) -> LicenseInfo {
        let now = Utc::now();
        LicenseClaims {
            customer: "Test".to_string(),
            features: features.iter().map(|s| s.to_string()).collect(),
            nbf: (now - Duration::days(1)).timestamp(),
            exp: (now + Duration::days(30)).timestamp(),
        }
        .evaluate(now)
    }

    #[tokio::test]
    async fn test_defaults_to_restaurant() {
        let (_dir, registry) = registry().await;
        assert_eq!(registry.mode().await, Mode::Restaurant);
    }

    #[tokio::test]
    async fn test_cashier_cannot_switch_mode() {
        let (_dir, registry) = registry().await;

        let err = registry
            .set_mode(Mode::Grocery, Role::Cashier, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::DbError::Domain(CoreError::Unauthorized { .. })
        ));

        // Mode unchanged.
        assert_eq!(registry.mode().await, Mode::Restaurant);
    }

    #[tokio::test]
    async fn test_super_admin_switch_persists() {
        let (dir, registry) = registry().await;

        let mode = registry
            .set_mode(Mode::Grocery, Role::SuperAdmin, None)
            .await
            .unwrap();
        assert_eq!(mode, Mode::Grocery);
        registry.close().await;

        // A fresh registry over the same directory resumes in grocery.
        let reopened = ModeRegistry::open(dir.path()).await.unwrap();
        assert_eq!(reopened.mode().await, Mode::Grocery);
    }

    #[tokio::test]
    async fn test_mode_isolation() {
        let (_dir, registry) = registry().await;

        // Create an item in the restaurant store.
        let store = registry.store().await;
        let created = store
            .items()
            .insert(NewItem {
                name: "Tandoori Platter".to_string(),
                price_paise: 45_000,
                tax_rate_bps: 500,
                category: "Main Course".to_string(),
                stock: 10,
                mrp_paise: None,
                wholesale_paise: None,
                description: String::new(),
                expiry_date: None,
                product_code: None,
            })
            .await
            .unwrap();
        drop(store);

        registry
            .set_mode(Mode::Grocery, Role::SuperAdmin, None)
            .await
            .unwrap();

        // Not visible from the grocery store.
        let store = registry.store().await;
        assert!(store.items().get(created.id).await.unwrap().is_none());
        drop(store);

        // Switching back, it is still there.
        registry
            .set_mode(Mode::Restaurant, Role::SuperAdmin, None)
            .await
            .unwrap();
        let store = registry.store().await;
        let item = store.items().get(created.id).await.unwrap().unwrap();
        assert_eq!(item.name, "Tandoori Platter");
    }

    #[tokio::test]
    async fn test_license_not_covering_mode_rejects_switch() {
        let (_dir, registry) = registry().await;
        let restaurant_only = license(&["restaurant"]);

        let err = registry
            .set_mode(Mode::Grocery, Role::SuperAdmin, Some(&restaurant_only))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::DbError::Domain(CoreError::ModeNotLicensed { .. })
        ));
    }

    #[tokio::test]
    async fn test_license_auto_correction_is_idempotent() {
        let (_dir, registry) = registry().await;
        let retail_only = license(&["retail"]);

        // Persisted mode is RESTAURANT but the license only covers retail.
        let corrected = registry.current_mode(Some(&retail_only)).await.unwrap();
        assert_eq!(corrected, Mode::Grocery);

        // Second read: no further change, same answer.
        let again = registry.current_mode(Some(&retail_only)).await.unwrap();
        assert_eq!(again, Mode::Grocery);
        assert_eq!(registry.mode().await, Mode::Grocery);
    }
}
