use std::cmp::Ordering;

use fsw_datavector::TypedValue;
use fsw_errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// A Transition guard's comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    /// Evaluate `lhs <op> rhs`. Both values must carry the same
    /// [`fsw_datavector::ElementType`]; a float comparison against NaN on
    /// either side yields `false` for every operator, matching the
    /// platform's standard ordered-comparison semantics.
    pub fn evaluate(self, lhs: TypedValue, rhs: TypedValue) -> Result<bool> {
        let ordering = match (lhs, rhs) {
            (TypedValue::U8(a), TypedValue::U8(b)) => a.partial_cmp(&b),
            (TypedValue::U16(a), TypedValue::U16(b)) => a.partial_cmp(&b),
            (TypedValue::U32(a), TypedValue::U32(b)) => a.partial_cmp(&b),
            (TypedValue::U64(a), TypedValue::U64(b)) => a.partial_cmp(&b),
            (TypedValue::I8(a), TypedValue::I8(b)) => a.partial_cmp(&b),
            (TypedValue::I16(a), TypedValue::I16(b)) => a.partial_cmp(&b),
            (TypedValue::I32(a), TypedValue::I32(b)) => a.partial_cmp(&b),
            (TypedValue::I64(a), TypedValue::I64(b)) => a.partial_cmp(&b),
            (TypedValue::F32(a), TypedValue::F32(b)) => a.partial_cmp(&b),
            (TypedValue::F64(a), TypedValue::F64(b)) => a.partial_cmp(&b),
            (TypedValue::Bool(a), TypedValue::Bool(b)) => a.partial_cmp(&b),
            _ => return Err(Error::IncorrectType),
        };
        let Some(ordering) = ordering else {
            return Ok(false);
        };
        Ok(match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
        })
    }
}
