use std::collections::HashMap;
use std::sync::Arc;

use fsw_datavector::{DataVector, ElementId};
use fsw_errors::{Error, Result};

use crate::ids::StateId;
use crate::state::{State, StateConfig};

/// `StateMachine` construction config: the state element it writes on
/// transition, and the ordered list of state configs (the first becomes
/// current).
pub struct StateMachineConfig {
    pub state_element: ElementId,
    pub states: Vec<StateConfig>,
}

/// Composition of States, Actions, and Transitions (`spec.md` §4.7). The
/// state element in the Data Vector is written exclusively through
/// [`StateMachine::switch_to`] — `Actions::new`'s `InvalidAction` check is
/// what makes this structural rather than a convention.
pub struct StateMachine {
    dv: Arc<DataVector>,
    state_element: ElementId,
    states: HashMap<StateId, State>,
    order: Vec<StateId>,
    current: StateId,
}

impl StateMachine {
    pub fn create(dv: Arc<DataVector>, config: StateMachineConfig) -> Result<Self> {
        if config.states.is_empty() {
            return Err(Error::NoStates);
        }

        let mut states = HashMap::new();
        let mut order = Vec::with_capacity(config.states.len());
        for state_config in config.states {
            let id = state_config.id;
            if states.contains_key(&id) {
                return Err(Error::DuplicateName);
            }
            let state = State::build(&dv, config.state_element, state_config)?;
            states.insert(id, state);
            order.push(id);
        }

        let current = order[0];
        if let Some(state) = states.get_mut(&current) {
            state.actions.reset_iterator();
        }

        Ok(Self { dv, state_element: config.state_element, states, order, current })
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    /// Every configured state id, in construction order.
    pub fn state_ids(&self) -> &[StateId] {
        &self.order
    }

    /// One tick: evaluate the current state's transitions (switching state
    /// if one fires), then evaluate and execute its due actions at
    /// `elapsed_ns_in_state`.
    pub fn tick(&mut self, elapsed_ns_in_state: u64) -> Result<()> {
        let fired = {
            let state = self.states.get(&self.current).ok_or(Error::NameNotFound)?;
            state.transitions.check_transitions(&self.dv)?
        };
        if let Some(target) = fired {
            self.switch_to(target)?;
        }

        let due = {
            let state = self.states.get_mut(&self.current).ok_or(Error::NameNotFound)?;
            state.actions.check_actions(elapsed_ns_in_state)
        };
        for action in due {
            action.execute(&self.dv)?;
        }
        Ok(())
    }

    /// Switch to `target`: reject if it equals the current state
    /// (`InvalidTransition`) or doesn't exist (`NameNotFound`); otherwise
    /// write it into the state element and reset the new state's Actions
    /// iterator. This is the sole writer of the state element.
    pub fn switch_to(&mut self, target: StateId) -> Result<()> {
        if target == self.current {
            return Err(Error::InvalidTransition);
        }
        if !self.states.contains_key(&target) {
            return Err(Error::NameNotFound);
        }
        self.dv.write::<u32>(self.state_element, target.0)?;
        self.current = target;
        if let Some(state) = self.states.get_mut(&target) {
            state.actions.reset_iterator();
        }
        tracing::info!(state = target.0, "state machine transitioned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionEntry;
    use crate::comparison::Comparison;
    use crate::transition::Guard;
    use fsw_datavector::{DvConfig, ElementConfig, RegionConfig, RegionId, TypedValue};

    fn two_state_machine() -> (Arc<DataVector>, StateMachine) {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![
                ElementConfig::new(ElementId(0), TypedValue::U32(0)), // state element
                ElementConfig::new(ElementId(1), TypedValue::U8(0)),  // guard source
                ElementConfig::new(ElementId(2), TypedValue::U16(0)), // action target
            ],
        )]);
        let dv = Arc::new(DataVector::create(cfg).unwrap());

        let state_a = StateConfig::new(
            StateId(0),
            vec![(0, vec![ActionEntry::new(ElementId(2), TypedValue::U16(7))])],
            vec![Guard::new(ElementId(1), Comparison::Eq, TypedValue::U8(1), StateId(1))],
        );
        let state_b = StateConfig::new(StateId(1), vec![], vec![]);

        let sm_config = StateMachineConfig { state_element: ElementId(0), states: vec![state_a, state_b] };
        let sm = StateMachine::create(dv.clone(), sm_config).unwrap();
        (dv, sm)
    }

    #[test]
    fn first_state_is_current_and_runs_actions() {
        let (dv, mut sm) = two_state_machine();
        assert_eq!(sm.current(), StateId(0));
        sm.tick(0).unwrap();
        assert_eq!(dv.read::<u16>(ElementId(2)).unwrap(), 7);
    }

    #[test]
    fn transition_fires_and_writes_state_element() {
        let (dv, mut sm) = two_state_machine();
        dv.write::<u8>(ElementId(1), 1).unwrap();
        sm.tick(0).unwrap();
        assert_eq!(sm.current(), StateId(1));
        assert_eq!(dv.read::<u32>(ElementId(0)).unwrap(), 1);
    }

    #[test]
    fn switch_to_rejects_self_and_unknown_target() {
        let (_dv, mut sm) = two_state_machine();
        assert_eq!(sm.switch_to(StateId(0)).unwrap_err(), Error::InvalidTransition);
        assert_eq!(sm.switch_to(StateId(99)).unwrap_err(), Error::NameNotFound);
    }

    #[test]
    fn rejects_empty_and_duplicate_states() {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U32(0))],
        )]);
        let dv = Arc::new(DataVector::create(cfg).unwrap());

        let empty = StateMachineConfig { state_element: ElementId(0), states: vec![] };
        assert_eq!(StateMachine::create(dv.clone(), empty).unwrap_err(), Error::NoStates);

        let dup = StateMachineConfig {
            state_element: ElementId(0),
            states: vec![
                StateConfig::new(StateId(0), vec![], vec![]),
                StateConfig::new(StateId(0), vec![], vec![]),
            ],
        };
        assert_eq!(StateMachine::create(dv, dup).unwrap_err(), Error::DuplicateName);
    }
}
