//! Kernel-wide tunable constants.
//!
//! Named here instead of inlined at call sites, the way the teacher kernel
//! keeps its board/timer constants in one place (`timer.rs`'s `MSEC_PER_SEC`
//! and friends, `config::MAX_CPU_NUM`).

/// Maximum number of process table slots (xv6's `NPROC`).
pub const NPROC: usize = 64;

/// Number of simulated CPUs, each running its own picker loop.
pub const MAX_CPU_NUM: usize = 4;

/// Default nice value assigned at process creation.
pub const DEFAULT_NICE: u8 = 20;

/// Lowest valid nice value (highest priority).
pub const NICE_MIN: u8 = 0;

/// Highest valid nice value (lowest priority).
pub const NICE_MAX: u8 = 39;

/// Milliticks per tick, used to convert tick-granular quantities to the
/// millitick unit `runtime`/`vruntime`/`timeslice` are tracked in.
pub const MILLITICKS_PER_TICK: u32 = 1000;

/// Scheduling period (in ticks) the picker prorates a dispatched quantum
/// against: `timeslice = SCHED_PERIOD_TICKS * MILLITICKS_PER_TICK * weight / total_weight`.
pub const SCHED_PERIOD_TICKS: u32 = 10;

/// The millitick cost of "one tick's worth" of virtual time used by the
/// wake policy's head-start calculation.
pub const WAKE_HEADSTART_MILLITICKS: u32 = 1000;
