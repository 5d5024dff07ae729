//! The global process table.
//!
//! Every process lives in-place inside a fixed-size array of
//! [`Pcb`] slots — there is no separate ready queue data structure; the
//! "ready set" is simply the subset of slots with `state == Runnable`,
//! discovered by linear scan (see [`crate::task::scheduler`]). All reads
//! and writes to scheduling fields happen while [`PTABLE`]'s lock is held,
//! except the deliberately-unlocked scan in
//! [`crate::introspection::ps`].
//!
//! This mirrors the teacher kernel's single global `ptable` guarded by one
//! spinlock, generalised here from the teacher's heap-allocated
//! `Arc<TaskControlBlock>` + `BTreeMap` run queue back to the flat,
//! fixed-capacity array the original xv6-derived design specifies.

use lazy_static::lazy_static;
use spin::Mutex;

use crate::config::NPROC;
use crate::error::{SchedError, SchedResult};
use crate::task::pid::PidAllocator;
use crate::task::process::{Chan, Pcb, ProcessState};

/// The process table: a fixed array of PCB slots plus the bookkeeping the
/// picker and introspection layer need (pid allocation, the tick counter
/// `ps` reports).
pub struct ProcessTable {
    slots: [Pcb; NPROC],
    pids: PidAllocator,
    /// Process-wide counter advanced by accounting, read only by `ps`.
    pub(crate) total_ticks: u32,
}

lazy_static! {
    /// The single global scheduler lock protecting the process table.
    pub static ref PTABLE: Mutex<ProcessTable> = Mutex::new(ProcessTable::new());
}

impl Default for ProcessTable {
    /// A fresh table with every slot `Unused`, for embedders that want to
    /// reset or stand up scheduling state outside of [`PTABLE`].
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable {
    pub(crate) fn new() -> Self {
        const EMPTY: Pcb = Pcb::empty();
        ProcessTable {
            slots: [EMPTY; NPROC],
            pids: PidAllocator::new(),
            total_ticks: 0,
        }
    }

    /// Read-only access to a slot, for `ps`/`getnice` style lookups.
    pub fn slot(&self, index: usize) -> &Pcb {
        &self.slots[index]
    }

    /// Mutable access to a slot, for callers (accounting, wake, picker)
    /// that already hold the table lock.
    pub fn slot_mut(&mut self, index: usize) -> &mut Pcb {
        &mut self.slots[index]
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pcb> {
        self.slots.iter_mut()
    }

    fn find_slot_by_pid(&self, pid: u32) -> Option<usize> {
        self.slots.iter().position(|p| p.state != ProcessState::Unused && p.pid == pid)
    }

    /// `allocproc`: claim an `Unused` slot, transition it to `Embryo` with
    /// `nice = 20, runtime = 0, vruntime = 0`. Returns the slot index.
    pub fn alloc_proc(&mut self, name: &str) -> SchedResult<usize> {
        let index = self
            .slots
            .iter()
            .position(|p| p.state == ProcessState::Unused)
            .ok_or(SchedError::TableFull)?;
        let pid = self.pids.alloc();
        self.slots[index].reset_for_alloc(pid, name);
        log::trace!("alloc_proc: slot {} -> pid {} ({})", index, pid, name);
        Ok(index)
    }

    /// `userinit`: create the first user process and make it runnable.
    /// Reaffirms `nice/runtime/vruntime` at the `Runnable` transition the
    /// way the original source redundantly does.
    pub fn userinit(&mut self) -> usize {
        let index = self.alloc_proc("init").expect("fresh table must have free slots");
        let p = &mut self.slots[index];
        p.state = ProcessState::Runnable;
        p.nice = crate::config::DEFAULT_NICE;
        p.runtime = 0;
        p.vruntime = 0;
        index
    }

    /// `fork`: allocate a child slot that inherits the parent's
    /// `nice`/`runtime`/`vruntime`, and make it runnable.
    ///
    /// Inheriting `vruntime` wholesale (rather than clamping to the
    /// current minimum) lets a freshly-forked child coast on the parent's
    /// accumulated CPU credit — a known CFS fairness anomaly, preserved
    /// here rather than corrected.
    pub fn fork(&mut self, parent_index: usize) -> SchedResult<u32> {
        let (p_pid, p_nice, p_runtime, p_vruntime, p_name) = {
            let parent = &self.slots[parent_index];
            (parent.pid, parent.nice, parent.runtime, parent.vruntime, FixedName::from(parent.name()))
        };
        let child_index = self.alloc_proc(&p_name)?;
        let child = &mut self.slots[child_index];
        child.nice = p_nice;
        child.runtime = p_runtime;
        child.vruntime = p_vruntime;
        child.parent = Some(parent_index);
        child.state = ProcessState::Runnable;
        let child_pid = child.pid;
        log::debug!("fork: pid {} -> child pid {}", p_pid, child_pid);
        Ok(child_pid)
    }

    /// `exit`: transition a `Running` process to `Zombie`. Orphaned
    /// children are not reparented to a tracked `init` here (that glue
    /// lives in the demonstration shell, which does know which slot is
    /// `init`); this method only performs the table-local state change.
    pub fn exit(&mut self, index: usize) {
        let pid = self.slots[index].pid;
        self.slots[index].state = ProcessState::Zombie;
        log::debug!("exit: pid {} -> ZOMBIE", pid);
    }

    /// `wait`: reap the first `Zombie` child of `parent_index`, if any.
    /// Returns the reaped child's pid. Non-blocking: in this synchronous
    /// host simulation there is no kernel thread to suspend, so a caller
    /// wanting xv6's blocking `wait()` semantics polls this in a loop
    /// (typically via `sleep`/`wakeup` on the parent itself, as in the
    /// original `exit()`'s `wakeup1(curproc->parent)`).
    pub fn wait(&mut self, parent_index: usize) -> Option<u32> {
        let child = self
            .slots
            .iter()
            .position(|p| p.parent == Some(parent_index) && p.state == ProcessState::Zombie)?;
        let pid = self.slots[child].pid;
        self.slots[child] = Pcb::empty();
        Some(pid)
    }

    /// `sleep`: transition a `Running` process to `Sleeping` on `chan`.
    pub fn sleep(&mut self, index: usize, chan: Chan) {
        let p = &mut self.slots[index];
        p.state = ProcessState::Sleeping;
        p.chan = chan;
    }

    /// `kill`: flag the target for lazy exit; if it is `Sleeping`, force
    /// it `Runnable` immediately so it observes the flag, *without*
    /// running it through the wake policy's vruntime adjustment. A
    /// process that slept a long time keeps a stale, possibly-zero
    /// `vruntime` and will dominate the picker until it catches up.
    pub fn kill(&mut self, pid: u32) -> SchedResult<()> {
        let index = self.find_slot_by_pid(pid).ok_or(SchedError::ProcessNotFound { pid })?;
        let p = &mut self.slots[index];
        p.killed = true;
        if p.state == ProcessState::Sleeping {
            p.state = ProcessState::Runnable;
            log::warn!("kill: pid {} forced out of SLEEPING without a vruntime adjustment", pid);
        }
        Ok(())
    }

    pub fn find_by_pid(&self, pid: u32) -> Option<usize> {
        self.find_slot_by_pid(pid)
    }

    /// Borrow a slot and the process-wide tick counter simultaneously —
    /// needed by accounting, which advances both at once under one lock.
    pub fn slot_and_ticks_mut(&mut self, index: usize) -> (&mut Pcb, &mut u32) {
        (&mut self.slots[index], &mut self.total_ticks)
    }

    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }
}

/// A tiny stack-allocated copy of a process name, so `fork` can read the
/// parent's name before taking a second mutable borrow for the child —
/// avoids a heap dependency for something this small and already
/// capped at 16 bytes.
struct FixedName {
    buf: [u8; 16],
    len: u8,
}

impl FixedName {
    fn from(s: &str) -> Self {
        let mut buf = [0u8; 16];
        let bytes = s.as_bytes();
        let len = bytes.len().min(16);
        buf[..len].copy_from_slice(&bytes[..len]);
        FixedName { buf, len: len as u8 }
    }
}

impl core::ops::Deref for FixedName {
    type Target = str;
    fn deref(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or("?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> ProcessTable {
        ProcessTable::new()
    }

    #[test]
    fn alloc_proc_starts_embryo_with_defaults() {
        let mut t = fresh();
        let idx = t.alloc_proc("a").unwrap();
        let p = t.slot(idx);
        assert_eq!(p.state, ProcessState::Embryo);
        assert_eq!(p.nice, 20);
        assert_eq!(p.runtime, 0);
        assert_eq!(p.vruntime, 0);
    }

    #[test]
    fn userinit_is_runnable() {
        let mut t = fresh();
        let idx = t.userinit();
        assert_eq!(t.slot(idx).state, ProcessState::Runnable);
    }

    #[test]
    fn fork_inherits_parent_scheduling_state() {
        let mut t = fresh();
        let parent = t.userinit();
        t.slot_mut(parent).nice = 5;
        t.slot_mut(parent).runtime = 100;
        t.slot_mut(parent).vruntime = 200;
        let child_pid = t.fork(parent).unwrap();
        let child_idx = t.find_by_pid(child_pid).unwrap();
        let child = t.slot(child_idx);
        assert_eq!(child.nice, 5);
        assert_eq!(child.runtime, 100);
        assert_eq!(child.vruntime, 200);
        assert_eq!(child.state, ProcessState::Runnable);
        assert_eq!(child.parent, Some(parent));
    }

    #[test]
    fn table_full_when_no_unused_slot() {
        let mut t = fresh();
        for _ in 0..t.capacity() {
            t.alloc_proc("x").unwrap();
        }
        assert_eq!(t.alloc_proc("overflow"), Err(SchedError::TableFull));
    }

    #[test]
    fn wait_reaps_zombie_child_and_frees_slot() {
        let mut t = fresh();
        let parent = t.userinit();
        let child_pid = t.fork(parent).unwrap();
        let child_idx = t.find_by_pid(child_pid).unwrap();
        t.exit(child_idx);
        let reaped = t.wait(parent);
        assert_eq!(reaped, Some(child_pid));
        assert_eq!(t.slot(child_idx).state, ProcessState::Unused);
    }

    #[test]
    fn kill_sleeping_process_wakes_without_vruntime_adjustment() {
        let mut t = fresh();
        let idx = t.userinit();
        t.sleep(idx, 42);
        t.slot_mut(idx).vruntime = 7;
        let pid = t.slot(idx).pid;
        t.kill(pid).unwrap();
        assert_eq!(t.slot(idx).state, ProcessState::Runnable);
        assert_eq!(t.slot(idx).vruntime, 7, "kill must not touch vruntime");
    }

    #[test]
    fn kill_unknown_pid_errors() {
        let mut t = fresh();
        assert_eq!(t.kill(9999), Err(SchedError::ProcessNotFound { pid: 9999 }));
    }
}
