//! Record store module
//!
//! Holds the immutable bird records loaded once at startup. The store is
//! shared read-only between all connections, so no locking is involved.

mod types;

pub use types::{BirdCollection, BirdId};

/// Seed records, loaded when the server starts
const SEED: [(BirdId, &str); 4] = [
    (17852, "Trana"),
    (25340, "Koltrast"),
    (27361, "Blåmes"),
    (27392, "Talgoxe"),
];

/// Immutable snapshot of all bird records
#[derive(Debug, Clone)]
pub struct BirdStore {
    all: BirdCollection,
}

impl BirdStore {
    /// Build the store from the built-in seed records
    pub fn seeded() -> Self {
        Self::from_records(SEED.iter().map(|&(id, name)| (id, name.to_string())))
    }

    /// Build the store from arbitrary records (later duplicates replace earlier ones)
    pub fn from_records(records: impl IntoIterator<Item = (BirdId, String)>) -> Self {
        Self {
            all: records.into_iter().collect(),
        }
    }

    /// The full collection
    pub const fn get_all(&self) -> &BirdCollection {
        &self.all
    }

    /// Look up a single bird name
    pub fn get_by_id(&self, id: BirdId) -> Option<&str> {
        self.all.birds.get(&id).map(String::as_str)
    }

    /// Collect the birds whose name starts with `prefix`
    ///
    /// Matching is case-sensitive and compares code points exactly. An empty
    /// prefix is a literal prefix of every name, so it selects everything.
    pub fn filter_by_prefix(&self, prefix: &str) -> BirdCollection {
        self.all
            .birds
            .iter()
            .filter(|(_, name)| name.starts_with(prefix))
            .map(|(&id, name)| (id, name.clone()))
            .collect()
    }

    /// Number of records in the store
    pub const fn count(&self) -> usize {
        self.all.count
    }
}

impl Default for BirdStore {
    fn default() -> Self {
        Self::seeded()
    }
}
