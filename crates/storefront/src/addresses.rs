//! Address book with an explicit online/offline mode.
//!
//! The legacy frontend silently dual-wrote addresses to the API and to local
//! storage, with the default-address invariant enforced ad hoc in two
//! diverging places. Here the rules are explicit:
//!
//! - Local state is applied first, in one place ([`apply_local`]) that owns
//!   the at-most-one-default invariant.
//! - When the push to the API fails with a connection-class error, the
//!   operation is journaled and the book is *offline*; anything else rolls
//!   the local change back and surfaces the error.
//! - [`AddressBook::reconcile`] replays the journal in order and then takes
//!   the server list as the source of truth (server wins).

use nyraa_core::AddressId;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Address, AddressOp};
use crate::store::{StateError, StateStore};

/// Whether address writes are reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Writes go to the API; reads prefer the API.
    Online,
    /// Journaled operations are waiting for [`AddressBook::reconcile`];
    /// reads serve the local copy.
    Offline,
}

/// Errors from address book operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// A required field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The address does not exist locally.
    #[error("address {0} not found")]
    NotFound(AddressId),

    /// Backend API error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client state error.
    #[error(transparent)]
    State(#[from] StateError),
}

/// An operation dropped during reconciliation because the server rejected it
/// outright (not a connectivity problem).
#[derive(Debug, Clone)]
pub struct DroppedOp {
    pub op: AddressOp,
    pub reason: String,
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Operations the server rejected; everything else was replayed.
    pub dropped: Vec<DroppedOp>,
}

/// Address book service over the state store and API client.
pub struct AddressBook<'a> {
    store: &'a StateStore,
    api: &'a ApiClient,
}

impl<'a> AddressBook<'a> {
    /// Create a new address book.
    #[must_use]
    pub const fn new(store: &'a StateStore, api: &'a ApiClient) -> Self {
        Self { store, api }
    }

    /// Current sync mode, derived from the journal.
    #[must_use]
    pub fn mode(&self) -> SyncMode {
        if self.store.read(|s| s.pending_address_ops.is_empty()) {
            SyncMode::Online
        } else {
            SyncMode::Offline
        }
    }

    /// Mint a client-side address id (millisecond timestamp, like the
    /// legacy frontend).
    #[must_use]
    pub fn mint_id() -> AddressId {
        AddressId::new(chrono::Utc::now().timestamp_millis())
    }

    /// The local copy of the address book.
    #[must_use]
    pub fn local(&self) -> Vec<Address> {
        self.store.read(|s| s.addresses.clone())
    }

    /// The current default address, if any.
    #[must_use]
    pub fn default_address(&self) -> Option<Address> {
        self.store
            .read(|s| s.addresses.iter().find(|a| a.is_default).cloned())
    }

    /// List addresses: API-first when online, local otherwise.
    ///
    /// A connection-class failure downgrades to the local copy instead of
    /// erroring; reads never require the network.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Api`] for non-connection API failures.
    pub async fn list(&self) -> Result<Vec<Address>, AddressError> {
        if self.mode() == SyncMode::Offline {
            return Ok(self.local());
        }

        match self.api.addresses().await {
            Ok(remote) => {
                self.store.mutate(|s| s.addresses = remote.clone())?;
                Ok(remote)
            }
            Err(e) if e.is_unreachable() => {
                warn!(error = %e, "address fetch failed, serving local copy");
                Ok(self.local())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create or update an address.
    ///
    /// Returns the saved address, which may carry a server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] for an incomplete address, or
    /// the API error if the push is rejected (the local change is rolled
    /// back in that case).
    pub async fn save(&self, address: Address) -> Result<Address, AddressError> {
        address.validate().map_err(AddressError::MissingField)?;

        let existed = self
            .store
            .read(|s| s.addresses.iter().any(|a| a.id == address.id));
        let snapshot = self.store.read(|s| s.addresses.clone());

        self.store.mutate(|s| {
            apply_local(
                &mut s.addresses,
                &AddressOp::Upsert {
                    address: address.clone(),
                },
            );
        })?;

        if self.mode() == SyncMode::Offline {
            self.journal(AddressOp::Upsert {
                address: address.clone(),
            })?;
            return Ok(address);
        }

        let pushed = if existed {
            self.api.update_address(&address).await
        } else {
            self.api.create_address(&address).await
        };

        match pushed {
            Ok(saved) => {
                if saved.id != address.id {
                    // Server reassigned the id; rewrite the local record.
                    let stale = address.id;
                    self.store.mutate(|s| {
                        if let Some(a) = s.addresses.iter_mut().find(|a| a.id == stale) {
                            *a = saved.clone();
                        }
                    })?;
                }
                Ok(saved)
            }
            Err(e) if e.is_unreachable() => {
                warn!(error = %e, "address push failed, journaling for reconcile");
                self.journal(AddressOp::Upsert { address: address.clone() })?;
                Ok(address)
            }
            Err(e) => {
                self.store.mutate(|s| s.addresses = snapshot)?;
                Err(e.into())
            }
        }
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NotFound`] for an unknown id, or the API
    /// error if the push is rejected.
    pub async fn delete(&self, id: AddressId) -> Result<(), AddressError> {
        if !self.store.read(|s| s.addresses.iter().any(|a| a.id == id)) {
            return Err(AddressError::NotFound(id));
        }
        let snapshot = self.store.read(|s| s.addresses.clone());

        self.store
            .mutate(|s| apply_local(&mut s.addresses, &AddressOp::Delete { id }))?;

        if self.mode() == SyncMode::Offline {
            self.journal(AddressOp::Delete { id })?;
            return Ok(());
        }

        match self.api.delete_address(id).await {
            Ok(()) => Ok(()),
            // Already gone server-side is success, not conflict.
            Err(ApiError::NotFound(_)) => Ok(()),
            Err(e) if e.is_unreachable() => {
                warn!(error = %e, "address delete failed, journaling for reconcile");
                self.journal(AddressOp::Delete { id })?;
                Ok(())
            }
            Err(e) => {
                self.store.mutate(|s| s.addresses = snapshot)?;
                Err(e.into())
            }
        }
    }

    /// Mark an address as the default.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NotFound`] for an unknown id, or the API
    /// error if the push is rejected.
    pub async fn set_default(&self, id: AddressId) -> Result<(), AddressError> {
        if !self.store.read(|s| s.addresses.iter().any(|a| a.id == id)) {
            return Err(AddressError::NotFound(id));
        }
        let snapshot = self.store.read(|s| s.addresses.clone());

        self.store
            .mutate(|s| apply_local(&mut s.addresses, &AddressOp::SetDefault { id }))?;

        if self.mode() == SyncMode::Offline {
            self.journal(AddressOp::SetDefault { id })?;
            return Ok(());
        }

        match self.api.set_default_address(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unreachable() => {
                warn!(error = %e, "set-default failed, journaling for reconcile");
                self.journal(AddressOp::SetDefault { id })?;
                Ok(())
            }
            Err(e) => {
                self.store.mutate(|s| s.addresses = snapshot)?;
                Err(e.into())
            }
        }
    }

    /// Replay the journal against the API, then adopt the server list.
    ///
    /// Stops (keeping the unplayed tail journaled) if the server becomes
    /// unreachable mid-replay. Server-rejected operations are dropped and
    /// reported rather than wedging the journal.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Api`] if the server is unreachable.
    pub async fn reconcile(&self) -> Result<ReconcileReport, AddressError> {
        let mut remaining = self.store.read(|s| s.pending_address_ops.clone());
        let mut report = ReconcileReport::default();

        while let Some(op) = remaining.first().cloned() {
            match self.push_op(&op).await {
                Ok(()) => {
                    remaining.remove(0);
                }
                Err(e) if e.is_unreachable() => {
                    self.store
                        .mutate(|s| s.pending_address_ops = remaining.clone())?;
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(error = %e, ?op, "server rejected journaled op, dropping");
                    report.dropped.push(DroppedOp {
                        op: remaining.remove(0),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Journal drained: the server list is now the truth.
        let remote = self.api.addresses().await?;
        self.store.mutate(|s| {
            s.addresses = remote;
            s.pending_address_ops.clear();
        })?;

        info!(dropped = report.dropped.len(), "address book reconciled");
        Ok(report)
    }

    async fn push_op(&self, op: &AddressOp) -> Result<(), ApiError> {
        match op {
            AddressOp::Upsert { address } => {
                match self.api.update_address(address).await {
                    Ok(_) => Ok(()),
                    // Unknown to the server yet: it was created offline.
                    Err(ApiError::NotFound(_)) => {
                        self.api.create_address(address).await.map(|_| ())
                    }
                    Err(e) => Err(e),
                }
            }
            AddressOp::Delete { id } => match self.api.delete_address(*id).await {
                Ok(()) | Err(ApiError::NotFound(_)) => Ok(()),
                Err(e) => Err(e),
            },
            AddressOp::SetDefault { id } => self.api.set_default_address(*id).await,
        }
    }

    fn journal(&self, op: AddressOp) -> Result<(), StateError> {
        self.store.mutate(|s| s.pending_address_ops.push(op))
    }
}

/// Apply an operation to the local list.
///
/// This is the single place that enforces the at-most-one-default invariant:
/// setting a default clears the others, and deleting the default promotes
/// the first remaining address.
fn apply_local(addresses: &mut Vec<Address>, op: &AddressOp) {
    match op {
        AddressOp::Upsert { address } => {
            if address.is_default {
                for a in addresses.iter_mut() {
                    a.is_default = false;
                }
            }
            if let Some(existing) = addresses.iter_mut().find(|a| a.id == address.id) {
                *existing = address.clone();
            } else {
                addresses.push(address.clone());
            }
        }
        AddressOp::Delete { id } => {
            let was_default = addresses.iter().any(|a| a.id == *id && a.is_default);
            addresses.retain(|a| a.id != *id);
            if was_default
                && let Some(first) = addresses.first_mut()
            {
                first.is_default = true;
            }
        }
        AddressOp::SetDefault { id } => {
            for a in addresses.iter_mut() {
                a.is_default = a.id == *id;
            }
        }
    }
}
