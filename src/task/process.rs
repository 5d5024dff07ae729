//! Process control block and process state.
//!
//! The states and their legal transitions mirror xv6's six-state process
//! lifecycle (`UNUSED, EMBRYO, SLEEPING, RUNNABLE, RUNNING, ZOMBIE`),
//! expressed as a small state machine in the style of the teacher kernel's
//! `state_machine.rs`.

use core::fmt::{self, Display, Formatter};

use crate::config::DEFAULT_NICE;

/// An opaque wait channel. Two sleeping processes are "on the same
/// channel" iff their `Chan` values compare equal; the kernel never
/// dereferences it, so the bit pattern's origin doesn't matter.
pub type Chan = usize;

/// Process lifecycle states, in the exact xv6 enumeration order (the order
/// is not meaningful for scheduling, but `ps`'s output and `procdump`-style
/// tooling rely on the name table lining up with it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProcessState {
    Unused = 0,
    Embryo = 1,
    Sleeping = 2,
    Runnable = 3,
    Running = 4,
    Zombie = 5,
}

impl ProcessState {
    /// Human-readable name, as printed by `ps`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProcessState::Unused => "UNUSED",
            ProcessState::Embryo => "EMBRYO",
            ProcessState::Sleeping => "SLEEPING",
            ProcessState::Runnable => "RUNNABLE",
            ProcessState::Running => "RUNNING",
            ProcessState::Zombie => "ZOMBIE",
        }
    }

    #[inline]
    pub const fn is_runnable(&self) -> bool {
        matches!(self, ProcessState::Runnable)
    }
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Is `from -> to` a transition the process lifecycle allows?
///
/// Used only by `debug_assert!`s at the call sites that perform a
/// transition — production builds trust the caller, matching the original
/// kernel's lack of runtime transition checks outside of `sched()`'s own
/// invariant assertions.
pub const fn is_valid_transition(from: ProcessState, to: ProcessState) -> bool {
    use ProcessState::*;
    matches!(
        (from, to),
        (Unused, Embryo)
            | (Embryo, Runnable)
            | (Embryo, Unused) // allocation failure unwind
            | (Runnable, Running)
            | (Running, Runnable) // yield / preempt
            | (Running, Sleeping) // block
            | (Running, Zombie) // exit
            | (Sleeping, Runnable) // wake, or kill-while-sleeping
            | (Zombie, Unused) // reaped by wait()
    )
}

/// Per-process scheduling and identity state.
///
/// A slot's meaning is only well-defined while `state != Unused`; a fresh
/// [`ProcessTable`](crate::task::table::ProcessTable) starts every slot out
/// `Unused` with the remaining fields zeroed.
#[derive(Debug, Clone)]
pub struct Pcb {
    pub pid: u32,
    pub state: ProcessState,
    pub name: [u8; 16],
    pub name_len: u8,
    /// Nice value in `[0, 39]`; default 20.
    pub nice: u8,
    /// Accumulated actual CPU time, in milliticks.
    pub runtime: u32,
    /// Virtual runtime, weight-normalised, in milliticks.
    pub vruntime: u32,
    /// Quantum granted at the most recent dispatch, in milliticks.
    pub timeslice: u32,
    /// Wait channel, meaningful only while `state == Sleeping`.
    pub chan: Chan,
    /// Table index of the parent, or `None` for the init process.
    pub parent: Option<usize>,
    /// Set by `kill`; observed and acted on lazily, as in the original.
    pub killed: bool,
}

impl Pcb {
    /// A fresh, `Unused` slot.
    pub const fn empty() -> Self {
        Pcb {
            pid: 0,
            state: ProcessState::Unused,
            name: [0; 16],
            name_len: 0,
            nice: DEFAULT_NICE,
            runtime: 0,
            vruntime: 0,
            timeslice: 0,
            chan: 0,
            parent: None,
            killed: false,
        }
    }

    /// Reset scheduling fields the way `allocproc` does for a freshly
    /// claimed `Embryo` slot: `nice <- 20, runtime <- 0, vruntime <- 0`.
    pub fn reset_for_alloc(&mut self, pid: u32, name: &str) {
        self.pid = pid;
        self.state = ProcessState::Embryo;
        self.set_name(name);
        self.nice = DEFAULT_NICE;
        self.runtime = 0;
        self.vruntime = 0;
        self.timeslice = 0;
        self.chan = 0;
        self.parent = None;
        self.killed = false;
    }

    pub fn set_name(&mut self, name: &str) {
        let bytes = name.as_bytes();
        let len = bytes.len().min(self.name.len());
        self.name[..len].copy_from_slice(&bytes[..len]);
        for b in &mut self.name[len..] {
            *b = 0;
        }
        self.name_len = len as u8;
    }

    pub fn name(&self) -> &str {
        core::str::from_utf8(&self.name[..self.name_len as usize]).unwrap_or("?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_is_unused_with_neutral_nice() {
        let p = Pcb::empty();
        assert_eq!(p.state, ProcessState::Unused);
        assert_eq!(p.nice, DEFAULT_NICE);
        assert_eq!(p.runtime, 0);
        assert_eq!(p.vruntime, 0);
    }

    #[test]
    fn reset_for_alloc_zeroes_scheduling_fields() {
        let mut p = Pcb::empty();
        p.nice = 5;
        p.runtime = 999;
        p.vruntime = 999;
        p.reset_for_alloc(7, "init");
        assert_eq!(p.pid, 7);
        assert_eq!(p.state, ProcessState::Embryo);
        assert_eq!(p.nice, DEFAULT_NICE);
        assert_eq!(p.runtime, 0);
        assert_eq!(p.vruntime, 0);
        assert_eq!(p.name(), "init");
    }

    #[test]
    fn name_truncates_to_capacity() {
        let mut p = Pcb::empty();
        p.set_name("a_name_much_longer_than_sixteen_bytes");
        assert_eq!(p.name().len(), 16);
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use ProcessState::*;
        assert!(is_valid_transition(Runnable, Running));
        assert!(is_valid_transition(Running, Sleeping));
        assert!(is_valid_transition(Sleeping, Runnable));
        assert!(!is_valid_transition(Unused, Running));
        assert!(!is_valid_transition(Zombie, Running));
    }
}
