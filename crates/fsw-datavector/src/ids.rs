use serde::{Deserialize, Serialize};

/// Identifies a single scalar slot in a [`crate::DataVector`].
///
/// Drawn from one global namespace: two elements in the same config must
/// never share an id, even across regions (invariant I1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Identifies a contiguous, ordered group of elements (invariant I1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl From<u32> for ElementId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<u32> for RegionId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
