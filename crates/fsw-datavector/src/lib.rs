//! The Data Vector: a typed, region-partitioned, lock-protected shared
//! buffer with bit-exact on-wire layout. The process-wide consistency
//! substrate for a single node (`spec.md` §3, §4.1).

mod config;
mod ids;
mod lock;
mod value;
mod vector;

pub use config::{DvConfig, ElementConfig, RegionConfig};
pub use ids::{ElementId, RegionId};
pub use lock::DvGuard;
pub use value::{DvScalar, ElementType, TypedValue};
pub use vector::{DataVector, MAX_REGION_BYTES};

/// Run a fallible per-tick step; on failure, increment `counter` instead of
/// aborting the loop. The step's own error is swallowed (it was already
/// logged by the caller's `tracing` instrumentation, if any) and replaced by
/// whatever `increment` on the counter element itself returns.
///
/// Mirrors the non-fatal "per-step errors increment the node's error
/// counter" rule (`spec.md` §7); kept here rather than in `fsw-errors`
/// because it needs a `&DataVector`, and `fsw-datavector` already depends on
/// `fsw-errors` for its `Result` type.
pub fn increment_on_error<T>(
    result: fsw_errors::Result<T>,
    dv: &DataVector,
    counter: ElementId,
) -> fsw_errors::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(err) => {
            tracing::warn!(?err, "step failed, incrementing error counter");
            match dv.increment(counter) {
                Ok(()) | Err(fsw_errors::Error::AlreadyMax) => Ok(None),
                Err(other) => Err(other),
            }
        }
    }
}
