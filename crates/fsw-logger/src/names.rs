use std::collections::HashMap;

use fsw_datavector::{ElementId, RegionId};

/// Human-readable names for regions/elements, for the WATCH and CSV sinks.
///
/// The original logger carried these as two file-scoped static maps,
/// populated by hand from the enum definitions; any id missing from the map
/// fell back to its numeric value. Here the map is just config, supplied by
/// whoever assembles the node, and the same fallback applies.
#[derive(Debug, Clone, Default)]
pub struct LogNames {
    regions: HashMap<RegionId, String>,
    elements: HashMap<ElementId, String>,
}

impl LogNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, id: RegionId, name: impl Into<String>) -> Self {
        self.regions.insert(id, name.into());
        self
    }

    pub fn with_element(mut self, id: ElementId, name: impl Into<String>) -> Self {
        self.elements.insert(id, name.into());
        self
    }

    pub fn region_name(&self, id: RegionId) -> String {
        self.regions.get(&id).cloned().unwrap_or_else(|| id.0.to_string())
    }

    pub fn element_name(&self, id: ElementId) -> String {
        self.elements.get(&id).cloned().unwrap_or_else(|| id.0.to_string())
    }
}
