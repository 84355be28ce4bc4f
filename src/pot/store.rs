//! In-memory pot registry shared by every connection.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::PotConfig;
use crate::pot::types::{Pot, PotKind, PotSummary};

/// Registry of pots keyed by URI (`coffee://<id>`, `tea://<id>`).
///
/// Pots keep their registration order for listings. Each pot has its own
/// lock; handlers touch a pot only through [`PotStore::with_pot`].
#[derive(Debug, Default)]
pub struct PotStore {
    pots: Vec<Mutex<Pot>>,
    by_uri: HashMap<String, usize>,
    ids: Vec<String>,
}

impl PotStore {
    /// Build the store from pots. A URI seen twice keeps the first pot.
    pub fn new(pots: impl IntoIterator<Item = Pot>) -> Self {
        let mut store = Self::default();
        for pot in pots {
            let uri = pot.uri();
            if store.by_uri.contains_key(&uri) {
                tracing::warn!(uri = %uri, "Duplicate pot ignored");
                continue;
            }
            store.by_uri.insert(uri, store.pots.len());
            store.ids.push(pot.id().to_string());
            store.pots.push(Mutex::new(pot));
        }
        store
    }

    /// Build the store from the configured registry.
    pub fn from_config(pots: &[PotConfig]) -> Self {
        Self::new(pots.iter().map(|p| {
            Pot::new(p.id.clone(), p.kind, p.capacity, p.level, p.varieties.clone())
        }))
    }

    /// Registered pot ids, in registration order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.pots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Run `f` with exclusive access to the pot, looking up `coffee://<id>`
    /// before `tea://<id>`. Returns `None` when neither is registered.
    pub fn with_pot<R>(&self, id: &str, f: impl FnOnce(&mut Pot) -> R) -> Option<R> {
        let index = self.position(id)?;
        let mut pot = lock(&self.pots[index]);
        Some(f(&mut pot))
    }

    /// `(uri, summary)` for every pot, in registration order.
    pub fn summaries(&self) -> Vec<(String, PotSummary)> {
        self.pots
            .iter()
            .map(|slot| {
                let pot = lock(slot);
                (pot.uri(), pot.summary())
            })
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        [PotKind::Coffee, PotKind::Teapot]
            .iter()
            .find_map(|kind| self.by_uri.get(&format!("{}://{}", kind.scheme(), id)))
            .copied()
    }
}

/// A panic while holding a pot lock leaves the pot in a consistent state
/// (every mutation is a single step), so poisoning is ignored.
fn lock(slot: &Mutex<Pot>) -> MutexGuard<'_, Pot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
