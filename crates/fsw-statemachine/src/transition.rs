use fsw_datavector::{DataVector, ElementId, TypedValue};
use fsw_errors::Result;
use serde::{Deserialize, Serialize};

use crate::comparison::Comparison;
use crate::ids::StateId;

/// One transition guard: `(element, comparison, literal, target_state)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guard {
    pub element: ElementId,
    pub comparison: Comparison,
    pub literal: TypedValue,
    pub target: StateId,
}

impl Guard {
    pub const fn new(element: ElementId, comparison: Comparison, literal: TypedValue, target: StateId) -> Self {
        Self { element, comparison, literal, target }
    }
}

/// A state's ordered list of transition guards; first match wins
/// (`spec.md` §4.6).
#[derive(Debug)]
pub struct Transitions {
    guards: Vec<Guard>,
}

impl Transitions {
    /// Validate and build a guard list. Every referenced element must
    /// exist in `dv` with the guard's declared (literal's) type.
    pub fn new(dv: &DataVector, guards: Vec<Guard>) -> Result<Self> {
        for guard in &guards {
            dv.type_of(guard.element)
                .and_then(|declared| if declared == guard.literal.element_type() {
                    Ok(())
                } else {
                    Err(fsw_errors::Error::IncorrectType)
                })?;
        }
        Ok(Self { guards })
    }

    /// Evaluate each guard in config order; return the target of the first
    /// one that holds, or `None` if none do.
    pub fn check_transitions(&self, dv: &DataVector) -> Result<Option<StateId>> {
        for guard in &self.guards {
            let current = dv.read_typed(guard.element, guard.literal.element_type())?;
            if guard.comparison.evaluate(current, guard.literal)? {
                return Ok(Some(guard.target));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsw_datavector::{DvConfig, ElementConfig, RegionConfig, RegionId};

    #[test]
    fn scenario_s2_first_match_wins() {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U8(3))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        let guards = vec![
            Guard::new(ElementId(0), Comparison::Ge, TypedValue::U8(2), StateId(1)),
            Guard::new(ElementId(0), Comparison::Eq, TypedValue::U8(3), StateId(2)),
        ];
        let transitions = Transitions::new(&dv, guards).unwrap();
        assert_eq!(transitions.check_transitions(&dv).unwrap(), Some(StateId(1)));
    }

    #[test]
    fn no_guard_firing_returns_none() {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U8(0))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        let guards = vec![Guard::new(ElementId(0), Comparison::Gt, TypedValue::U8(5), StateId(1))];
        let transitions = Transitions::new(&dv, guards).unwrap();
        assert_eq!(transitions.check_transitions(&dv).unwrap(), None);
    }
}
