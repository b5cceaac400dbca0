use fsw_datavector::{DataVector, ElementId, TypedValue};
use fsw_errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single `(element, target_value)` write, due at a scheduled elapsed
/// time since state entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub element: ElementId,
    pub value: TypedValue,
}

impl ActionEntry {
    pub const fn new(element: ElementId, value: TypedValue) -> Self {
        Self { element, value }
    }

    /// Perform the write this action schedules.
    pub fn execute(&self, dv: &DataVector) -> Result<()> {
        dv.write_typed(self.element, self.value)
    }
}

/// A state's schedule of writes: an ordered map from elapsed nanoseconds
/// since state entry to the actions due at-or-after that time
/// (`spec.md` §4.5).
#[derive(Debug)]
pub struct Actions {
    entries: Vec<(u64, Vec<ActionEntry>)>,
    cursor: usize,
}

impl Actions {
    /// Validate and build an `Actions` schedule. Every referenced element
    /// must exist in `dv` with the action's declared type, and no action
    /// may target `state_element` — state changes are reserved to the
    /// `StateMachine` (`Error::InvalidAction`).
    pub fn new(dv: &DataVector, state_element: ElementId, schedule: Vec<(u64, Vec<ActionEntry>)>) -> Result<Self> {
        let mut merged: std::collections::BTreeMap<u64, Vec<ActionEntry>> = std::collections::BTreeMap::new();
        for (elapsed_ns, batch) in schedule {
            for action in &batch {
                if action.element == state_element {
                    return Err(Error::InvalidAction);
                }
                let declared = dv.type_of(action.element)?;
                if declared != action.value.element_type() {
                    return Err(Error::IncorrectType);
                }
            }
            merged.entry(elapsed_ns).or_default().extend(batch);
        }
        Ok(Self { entries: merged.into_iter().collect(), cursor: 0 })
    }

    /// Rewind to the first scheduled bucket, called on state entry.
    pub fn reset_iterator(&mut self) {
        self.cursor = 0;
    }

    /// Advance past every bucket whose key is `<= elapsed_ns`, returning
    /// the concatenation of their actions in schedule order. Calling this
    /// again with a larger `elapsed_ns` resumes from where the last call
    /// left off; it never re-returns an already-passed bucket.
    pub fn check_actions(&mut self, elapsed_ns: u64) -> Vec<ActionEntry> {
        let mut due = Vec::new();
        while self.cursor < self.entries.len() && self.entries[self.cursor].0 <= elapsed_ns {
            due.extend(self.entries[self.cursor].1.iter().copied());
            self.cursor += 1;
        }
        due
    }
}
