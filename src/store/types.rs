// Record types module
// Serializable shapes of the bird records

use serde::Serialize;
use std::collections::BTreeMap;

/// Bird identifier (five digits by convention, not enforced)
pub type BirdId = i64;

/// A group of birds plus the size of that group
///
/// `count` must equal `birds.len()`. Build values with `collect()` so the
/// count is derived from the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirdCollection {
    pub birds: BTreeMap<BirdId, String>,
    pub count: usize,
}

impl BirdCollection {
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl FromIterator<(BirdId, String)> for BirdCollection {
    fn from_iter<I: IntoIterator<Item = (BirdId, String)>>(iter: I) -> Self {
        let birds: BTreeMap<BirdId, String> = iter.into_iter().collect();
        let count = birds.len();
        Self { birds, count }
    }
}
