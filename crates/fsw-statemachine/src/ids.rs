use serde::{Deserialize, Serialize};

/// Identifies one state in a [`crate::StateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub u32);
