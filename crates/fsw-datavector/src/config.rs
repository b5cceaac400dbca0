use serde::{Deserialize, Serialize};

use crate::ids::{ElementId, RegionId};
use crate::value::TypedValue;

/// One element's static configuration: its id and typed initial value.
///
/// Unlike the original `DV_ADD_<TYPE>` macros, which carry the initial
/// value as a raw `uint64_t` reinterpreted at construction time, the
/// initial value here is already a [`TypedValue`] — the unchecked-cast risk
/// the original documents (`DataVector::toUInt64`) doesn't exist in this
/// port (see `DESIGN.md`, Open Question #2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub id: ElementId,
    pub initial: TypedValue,
}

impl ElementConfig {
    pub const fn new(id: ElementId, initial: TypedValue) -> Self {
        Self { id, initial }
    }
}

/// An ordered, named group of elements forming one on-wire region payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub id: RegionId,
    pub elements: Vec<ElementConfig>,
}

impl RegionConfig {
    pub fn new(id: RegionId, elements: Vec<ElementConfig>) -> Self {
        Self { id, elements }
    }
}

/// The full, immutable construction config for a [`crate::DataVector`].
///
/// Built from Rust struct literals by assembly/demo code (`SPEC_FULL.md`
/// §1.3) — there is no external file-format loader in the core path, though
/// the `Serialize`/`Deserialize` derives let a demo or test express one as
/// TOML/JSON if it chooses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DvConfig {
    pub regions: Vec<RegionConfig>,
}

impl DvConfig {
    pub fn new(regions: Vec<RegionConfig>) -> Self {
        Self { regions }
    }
}
