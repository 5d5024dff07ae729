//! A CFS-style process scheduler for a small teaching kernel's process
//! table: nice values, weight-proportional timeslices, a vruntime-backed
//! picker, and the wake policy that keeps a process that just woke up
//! from starving everyone else.
//!
//! The process table itself (fixed-size, linearly scanned, one global
//! lock) follows the xv6 teaching-kernel design this scheduler was
//! written for; the surrounding crate plumbing — error types, logging,
//! configuration — follows the conventions of the production kernel this
//! crate was adapted from.

pub mod config;
pub mod error;
pub mod introspection;
pub mod task;

pub use error::{SchedError, SchedResult};
pub use introspection::{getnice, getpname, ps, setnice};
pub use task::{Pcb, ProcessState, ProcessTable, Scheduler, PTABLE};
