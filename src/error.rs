//! Crate-wide error taxonomy.
//!
//! Kernel code returns typed errors; the syscall-facing functions in
//! [`crate::introspection`] are the only places that flatten a
//! [`SchedError`] down to the `-1` sentinel the external ABI uses. This
//! split mirrors the teacher kernel's `KernelError`/`KernelResult`
//! convention, where internal code propagates a rich error type and only
//! the syscall boundary converts it to an errno-shaped integer.

use core::fmt::{self, Display, Formatter};

/// Crate-wide result type.
pub type SchedResult<T> = Result<T, SchedError>;

/// Errors the scheduler and process table can report.
///
/// Every variant here corresponds to one of the three non-fatal error
/// classes in the design's error taxonomy: not-found, invalid-argument,
/// and resource-exhaustion. Invariant violations are not represented as
/// `SchedError` values — they are caller bugs and are reported with
/// `panic!`, matching the original kernel's behavior of treating them as
/// fatal rather than recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// No process table slot has this pid.
    ProcessNotFound { pid: u32 },
    /// A nice value outside `[0, 39]` was requested.
    InvalidNice { value: i32 },
    /// No UNUSED slot was available for `fork`/`allocproc`.
    TableFull,
}

impl SchedError {
    /// Flatten to the `-1` sentinel the syscall surface returns on error.
    #[inline]
    pub const fn as_errno(&self) -> i32 {
        -1
    }
}

impl Display for SchedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::ProcessNotFound { pid } => write!(f, "no process with pid {}", pid),
            SchedError::InvalidNice { value } => {
                write!(f, "nice value {} out of range [0, 39]", value)
            }
            SchedError::TableFull => write!(f, "process table has no free slot"),
        }
    }
}
