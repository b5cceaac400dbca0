use fsw_datavector::{DataVector, ElementId};
use fsw_errors::Result;

use crate::action::{ActionEntry, Actions};
use crate::ids::StateId;
use crate::transition::{Guard, Transitions};

/// A state's construction config: its schedule of actions and its ordered
/// transition guards.
pub struct StateConfig {
    pub id: StateId,
    pub actions: Vec<(u64, Vec<ActionEntry>)>,
    pub transitions: Vec<Guard>,
}

impl StateConfig {
    pub fn new(id: StateId, actions: Vec<(u64, Vec<ActionEntry>)>, transitions: Vec<Guard>) -> Self {
        Self { id, actions, transitions }
    }
}

/// A named container of Actions and Transitions; exactly one is current in
/// a [`crate::StateMachine`] at a time.
pub struct State {
    pub id: StateId,
    pub(crate) actions: Actions,
    pub(crate) transitions: Transitions,
}

impl State {
    pub(crate) fn build(dv: &DataVector, state_element: ElementId, config: StateConfig) -> Result<Self> {
        let actions = Actions::new(dv, state_element, config.actions)?;
        let transitions = Transitions::new(dv, config.transitions)?;
        Ok(Self { id: config.id, actions, transitions })
    }
}
