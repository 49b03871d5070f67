//! Versioned client state persisted to a local JSON file.
//!
//! This replaces the legacy browser local-storage keys (`token`, `userData`,
//! `isLoggedIn`, `cart`, `wishlist`, `userAddresses`, `lastOrder`) with one
//! schema-versioned document. Legacy documents are upgraded on load by
//! [`migrate::migrate_legacy`]; a shape mismatch is an error, never a silent
//! `undefined` downstream.
//!
//! Writes are atomic (temp file + rename in the same directory). Concurrent
//! writers are last-writer-wins; cross-process locking is out of scope, as it
//! was for the original.

mod migrate;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cart::CartLine;
use crate::models::{Address, AddressOp, OrderReceipt, Session};
use crate::wishlist::WishlistItem;

/// Current client state schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from the state store.
#[derive(Debug, Error)]
pub enum StateError {
    /// Filesystem error reading or writing the state file.
    #[error("state file i/o error: {0}")]
    Io(#[from] io::Error),

    /// The state file exists but does not parse.
    #[error("state file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The state file was written by a newer client.
    #[error("state schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// The whole persisted client state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientState {
    pub schema_version: u32,
    pub session: Option<Session>,
    pub cart: Vec<CartLine>,
    pub wishlist: Vec<WishlistItem>,
    pub addresses: Vec<Address>,
    pub pending_address_ops: Vec<AddressOp>,
    pub last_order: Option<OrderReceipt>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            session: None,
            cart: Vec::new(),
            wishlist: Vec::new(),
            addresses: Vec::new(),
            pending_address_ops: Vec::new(),
            last_order: None,
        }
    }
}

/// File-backed state store.
///
/// Holds the state in memory behind a mutex and persists on every mutation
/// through [`StateStore::mutate`].
pub struct StateStore {
    path: PathBuf,
    state: Mutex<ClientState>,
}

impl StateStore {
    /// Open the store at `path`, loading existing state if present.
    ///
    /// A missing file starts from the default empty state. A legacy
    /// (unversioned) document is migrated in memory and written back on the
    /// next save.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Corrupt`] for an unparseable file and
    /// [`StateError::UnsupportedVersion`] for a document written by a newer
    /// client.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => load_state(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file, starting empty");
                ClientState::default()
            }
            Err(e) => return Err(StateError::Io(e)),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Read a value out of the current state.
    pub fn read<T>(&self, f: impl FnOnce(&ClientState) -> T) -> T {
        let guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&guard)
    }

    /// Apply a mutation and persist the result.
    ///
    /// The closure's return value is handed back to the caller. The state is
    /// written to disk after every successful application; an I/O failure
    /// leaves the in-memory state mutated (it will be retried by the next
    /// save) and surfaces the error.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the state file cannot be replaced.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut ClientState) -> T) -> Result<T, StateError> {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let out = f(&mut guard);
        guard.schema_version = SCHEMA_VERSION;
        persist(&self.path, &guard)?;
        Ok(out)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a raw state document, migrating legacy layouts.
fn load_state(raw: &str) -> Result<ClientState, StateError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let version = value.get("schema_version").and_then(serde_json::Value::as_u64);

    match version {
        Some(v) if v > u64::from(SCHEMA_VERSION) => Err(StateError::UnsupportedVersion {
            found: u32::try_from(v).unwrap_or(u32::MAX),
            supported: SCHEMA_VERSION,
        }),
        Some(_) => Ok(serde_json::from_value(value)?),
        None => {
            debug!("state file has no schema version, migrating legacy layout");
            Ok(migrate::migrate_legacy(&value))
        }
    }
}

/// Atomically replace the state file: write a sibling temp file, then rename.
fn persist(path: &Path, state: &ClientState) -> Result<(), StateError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    let body = serde_json::to_vec_pretty(state)?;
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nyraa_core::ProductId;

    use crate::cart::CartLine;
    use crate::models::VariantSelection;

    use super::*;

    fn line(id: i64) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: "999.00".parse().unwrap(),
            image: None,
            variant: VariantSelection::none(),
            quantity: 1,
            added_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json")).unwrap();
        assert!(store.read(|s| s.cart.is_empty()));
        assert_eq!(store.read(|s| s.schema_version), SCHEMA_VERSION);
    }

    #[test]
    fn test_mutation_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = StateStore::open(&path).unwrap();
        store.mutate(|s| s.cart.push(line(1))).unwrap();
        drop(store);

        let reopened = StateStore::open(&path).unwrap();
        assert_eq!(reopened.read(|s| s.cart.len()), 1);
        assert_eq!(
            reopened.read(|s| s.cart.first().map(|l| l.product_id)),
            Some(ProductId::new(1))
        );
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            StateStore::open(&path),
            Err(StateError::Corrupt(_))
        ));
        // the broken file is left in place for inspection
        assert!(path.exists());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"schema_version": 99}"#).unwrap();

        assert!(matches!(
            StateStore::open(&path),
            Err(StateError::UnsupportedVersion {
                found: 99,
                supported: SCHEMA_VERSION
            })
        ));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = StateStore::open(&path).unwrap();
        store.mutate(|s| s.cart.push(line(2))).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
