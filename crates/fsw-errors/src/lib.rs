//! # fsw-errors
//!
//! The closed error taxonomy shared by every crate in the flight-software
//! workspace. Every fallible operation in the core path returns
//! `Result<T, Error>` — there are no panics or exceptions used for control
//! flow (see `SPEC_FULL.md` §1.2).
//!
//! Variant names mirror the `Error_t` enumeration in the original `fsw`
//! tree's `Errors.hpp` one-for-one where a direct counterpart exists, with
//! the `E_` prefix dropped and `SCREAMING_CASE` turned into `PascalCase`.

use thiserror::Error;

/// The result alias used across the workspace's core path.
pub type Result<T> = core::result::Result<T, Error>;

/// The closed set of failure kinds any flight-software operation may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    // ── General / config validation ─────────────────────────────────────
    #[error("enum value is not one of the defined variants")]
    InvalidEnum,
    #[error("element id does not exist in this Data Vector")]
    InvalidElem,
    #[error("region id does not exist in this Data Vector")]
    InvalidRegion,
    #[error("type does not belong to the closed set of Data Vector element types")]
    InvalidType,
    #[error("operation's type parameter does not match the element's declared type")]
    IncorrectType,
    #[error("supplied buffer size does not match the expected region/vector size")]
    IncorrectSize,
    #[error("configuration has no regions")]
    EmptyConfig,
    #[error("a region's element list is empty")]
    EmptyElems,
    #[error("two regions share the same region id")]
    DuplicateRegion,
    #[error("two elements share the same element id")]
    DuplicateElem,
    #[error("a region's payload exceeds the 1024-byte wire ceiling")]
    RegionTooLarge,
    #[error("integer element is already at its type's maximum value")]
    AlreadyMax,
    #[error("invalid configuration")]
    InvalidConfig,

    // ── Data Vector locking ──────────────────────────────────────────────
    #[error("failed to initialise the Data Vector's lock")]
    FailedToInitLock,
    #[error("failed to acquire the Data Vector lock")]
    FailedToLock,
    #[error("failed to release the Data Vector lock")]
    FailedToUnlock,
    #[error("a read failed and the subsequent unlock also failed")]
    FailedToReadAndUnlock,
    #[error("a write failed and the subsequent unlock also failed")]
    FailedToWriteAndUnlock,

    // ── Network Manager ──────────────────────────────────────────────────
    #[error("send buffer is empty")]
    EmptyBuffer,
    #[error("node id is not a member of the configured topology")]
    InvalidNode,
    #[error("port lies outside the reserved [2201, 2299] range")]
    InvalidPort,
    #[error("IP address octet is not a valid decimal value <= 255")]
    InvalidIpOctet,
    #[error("IP address does not have exactly four octets")]
    InvalidIpSize,
    #[error("two nodes were configured with the same IP address")]
    DuplicateIp,
    #[error("two channels reference the same unordered node pair")]
    DuplicateChannel,
    #[error("socket sendto transmitted a different number of bytes than requested")]
    UnexpectedSendSize,
    #[error("socket recvfrom received a different number of bytes than expected")]
    UnexpectedRecvSize,
    #[error("sendto failed")]
    FailedToSendMsg,
    #[error("recvfrom failed")]
    FailedToRecvMsg,
    #[error("select()/poll() readiness wait failed")]
    SelectFailed,
    #[error("requested recv_mult timeout exceeds the 100s ceiling")]
    TimeoutTooLarge,
    #[error("parallel vectors passed to an operation have different lengths")]
    VectorsDiffSizes,

    // ── State machine ────────────────────────────────────────────────────
    #[error("transition target state equals the current state, or the state machine has no states")]
    InvalidTransition,
    #[error("state id does not exist in the state machine")]
    NameNotFound,
    #[error("two states were configured with the same state id")]
    DuplicateName,
    #[error("state machine configured with zero states")]
    NoStates,
    #[error("an action targets the state element, which only the state machine may write")]
    InvalidAction,

    // ── Command handler ──────────────────────────────────────────────────
    #[error("command request kind is not one of None/Launch/Abort/Write")]
    InvalidCmd,

    // ── Thread manager ───────────────────────────────────────────────────
    #[error("requested thread priority is outside [2, 12]")]
    InvalidPriority,
    #[error("requested thread affinity is not one of the configured cores")]
    InvalidAffinity,
    #[error("failed to raise priority of the kernel IRQ threads at process init")]
    FailedToInitKernelEnv,
    #[error("failed to spawn a SCHED_FIFO thread")]
    FailedToCreateThread,
    #[error("failed to join a thread")]
    FailedToWaitOnThread,
    #[error("failed to create a timerfd")]
    FailedToCreateTimerfd,
    #[error("failed to arm a timerfd")]
    FailedToArmTimerfd,
    #[error("failed to read a timerfd")]
    FailedToReadTimerfd,
    #[error("a periodic thread's body did not complete before the next period boundary")]
    MissedSchedulerDeadline,

    // ── Devices ───────────────────────────────────────────────────────────
    #[error("FPGA session failed to initialise")]
    FpgaInit,
    #[error("FPGA read failed")]
    FpgaRead,
    #[error("FPGA write failed")]
    FpgaWrite,
    #[error("device pin is outside the configured valid range")]
    PinNotConfigured,

    // ── Time ──────────────────────────────────────────────────────────────
    #[error("failed to read the monotonic OS clock")]
    FailedToGetTime,
    #[error("process-init instant is within one year of the clock's 32-bit-seconds overflow")]
    OverflowImminent,

    // ── Data Vector Logger ───────────────────────────────────────────────
    #[error("failed to open the logger's output file")]
    FailedToOpenFile,
    #[error("failed to write the logger's output file")]
    FailedToWriteFile,
    #[error("failed to seek the logger's output file")]
    FailedToSeek,
}

/// Exit the process if `result` is an error, after logging `msg` and the
/// underlying cause.
///
/// This is the Rust counterpart of the original `Errors::exitOnError`: it is
/// used only at assembly time (`SPEC_FULL.md` §4.12), never inside the
/// per-tick loop body, where per-step errors must instead be counted and
/// swallowed (see `increment_on_error` in `fsw-datavector`).
pub fn exit_on_error<T>(result: Result<T>, msg: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(error = %err, "{msg}");
            eprintln!("{msg}: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_non_empty() {
        assert!(!Error::InvalidElem.to_string().is_empty());
        assert!(!Error::MissedSchedulerDeadline.to_string().is_empty());
    }

    #[test]
    fn errors_are_copy_and_comparable() {
        let a = Error::AlreadyMax;
        let b = a;
        assert_eq!(a, b);
    }
}
