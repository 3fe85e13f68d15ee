//! Shared cache of localized USM credentials.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use super::{AuthProtocol, LocalizedKey, PrivKey, PrivProtocol};
use crate::codec::hex_octets;
use crate::error::Result;

/// Keys localized for one `(username, engineID)` pair.
#[derive(Debug, Clone)]
pub struct UsmUser {
    pub auth_key: Option<LocalizedKey>,
    pub priv_key: Option<PrivKey>,
}

impl UsmUser {
    /// Localize the configured passwords to `engine_id`.
    ///
    /// Privacy needs an authentication protocol to hash with; without one the
    /// user is noAuthNoPriv and `privacy` is ignored.
    pub fn derive(
        auth: Option<(AuthProtocol, &[u8])>,
        privacy: Option<(PrivProtocol, &[u8])>,
        engine_id: &[u8],
    ) -> Result<Self> {
        let Some((auth_protocol, auth_password)) = auth else {
            return Ok(Self {
                auth_key: None,
                priv_key: None,
            });
        };

        let auth_key = LocalizedKey::derive(auth_protocol, auth_password, engine_id)?;
        let priv_key = privacy
            .map(|(priv_protocol, password)| {
                PrivKey::derive(auth_protocol, priv_protocol, password, engine_id)
            })
            .transpose()?;

        Ok(Self {
            auth_key: Some(auth_key),
            priv_key,
        })
    }
}

type Slot = Arc<Mutex<Option<Arc<UsmUser>>>>;

/// Credential cache keyed by `(username, engineID)`.
///
/// Share one instance (behind an `Arc`) between all sessions of a process.
/// Each key has its own lock, held across evict, derive and insert, so two
/// sessions opening against the same agent never observe a half-replaced
/// entry while sessions for other agents proceed.
///
/// Derivation hashes 1 MiB of password material per key while holding a
/// blocking lock, so a refresh stalls its runtime worker for a few
/// milliseconds.
#[derive(Debug, Default)]
pub struct UsmCredentialCache {
    slots: Mutex<HashMap<(String, Bytes), Slot>>,
}

impl UsmCredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, username: &str, engine_id: &Bytes) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry((username.to_owned(), engine_id.clone()))
            .or_default()
            .clone()
    }

    /// Replace the entry for `(username, engine_id)` with freshly derived keys.
    ///
    /// A stale entry is evicted first, so credentials changed on the device
    /// side take effect on the next session. If `derive` fails the key is
    /// removed from the cache.
    pub fn refresh<F>(&self, username: &str, engine_id: &Bytes, derive: F) -> Result<Arc<UsmUser>>
    where
        F: FnOnce() -> Result<UsmUser>,
    {
        let slot = self.slot(username, engine_id);
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if entry.take().is_some() {
            tracing::debug!(
                target: "snmp_southbound::usm",
                { snmp.user = username, snmp.engine_id = %hex_octets(engine_id) },
                "evicted cached USM credentials"
            );
        }

        let user = match derive() {
            Ok(user) => Arc::new(user),
            Err(e) => {
                drop(entry);
                self.release_empty(username, engine_id, slot);
                return Err(e);
            }
        };
        *entry = Some(user.clone());
        tracing::trace!(
            target: "snmp_southbound::usm",
            { snmp.user = username, snmp.engine_id = %hex_octets(engine_id) },
            "cached USM credentials"
        );
        Ok(user)
    }

    /// Drop the slot for a key whose derivation failed, unless another
    /// refresh is waiting on it.
    fn release_empty(&self, username: &str, engine_id: &Bytes, slot: Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map and ours: nobody else can reach this slot.
        let unused = Arc::strong_count(&slot) == 2
            && slot.lock().unwrap_or_else(PoisonError::into_inner).is_none();
        if unused {
            slots.remove(&(username.to_owned(), engine_id.clone()));
        }
    }

    /// Currently cached keys, if any.
    pub fn get(&self, username: &str, engine_id: &Bytes) -> Option<Arc<UsmUser>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.get(&(username.to_owned(), engine_id.clone()))?.clone();
        drop(slots);
        let entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        entry.clone()
    }

    pub fn contains(&self, username: &str, engine_id: &Bytes) -> bool {
        self.get(username, engine_id).is_some()
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.values().cloned().collect()
        };
        slots
            .iter()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
