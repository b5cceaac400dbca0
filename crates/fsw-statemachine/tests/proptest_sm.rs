use std::sync::Arc;

use fsw_datavector::{DataVector, DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};
use fsw_statemachine::{ActionEntry, Comparison, Guard, StateConfig, StateId, StateMachine, StateMachineConfig, Transitions};
use proptest::prelude::*;

proptest! {
    /// P5: any Actions config that writes to the state element is rejected
    /// with `InvalidAction`, regardless of the scheduled time or value.
    #[test]
    fn p5_state_element_writes_rejected(elapsed_ns in any::<u64>(), value in any::<u32>()) {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U32(0))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        let err = fsw_statemachine::Actions::new(
            &dv,
            ElementId(0),
            vec![(elapsed_ns, vec![ActionEntry::new(ElementId(0), TypedValue::U32(value))])],
        )
        .unwrap_err();
        prop_assert_eq!(err, fsw_errors::Error::InvalidAction);
    }

    /// P6: when two guards would both fire, the first in config order wins
    /// and its declared target is returned.
    #[test]
    fn p6_first_match_wins(threshold in 0u8..200, probe in 0u8..255) {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U8(probe))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        let guards = vec![
            Guard::new(ElementId(0), Comparison::Ge, TypedValue::U8(threshold), StateId(1)),
            Guard::new(ElementId(0), Comparison::Ge, TypedValue::U8(threshold), StateId(2)),
        ];
        let transitions = Transitions::new(&dv, guards).unwrap();
        let outcome = transitions.check_transitions(&dv).unwrap();
        if probe >= threshold {
            prop_assert_eq!(outcome, Some(StateId(1)));
        } else {
            prop_assert_eq!(outcome, None);
        }
    }
}

#[test]
fn state_machine_smoke() {
    let cfg = DvConfig::new(vec![RegionConfig::new(
        RegionId(0),
        vec![ElementConfig::new(ElementId(0), TypedValue::U32(0))],
    )]);
    let dv = Arc::new(DataVector::create(cfg).unwrap());
    let config = StateMachineConfig {
        state_element: ElementId(0),
        states: vec![StateConfig::new(StateId(0), vec![], vec![])],
    };
    let sm = StateMachine::create(dv, config).unwrap();
    assert_eq!(sm.current(), StateId(0));
}
