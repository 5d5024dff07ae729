//! The CFS picker and the (host-simulated) per-CPU run loop.
//!
//! The picker itself — find the runnable process with the smallest
//! `vruntime`, breaking ties by table order, then hand it a timeslice
//! proportional to its weight — is a direct generalisation of the
//! teacher kernel's `calc_time_slice`/`pick_next` pair in
//! `cfs_scheduler.rs`, adapted from that file's `BTreeMap`-ordered run
//! queue to a linear scan over the fixed process table, per this
//! project's design.
//!
//! There is no real trap/interrupt layer here, so [`Scheduler::tick_cpu`]
//! and [`Scheduler::run_for`] stand in for the teacher's
//! `Processor::run_tasks` infinite loop: each call simulates exactly one
//! timer tick's worth of accounting and (if the running process's
//! timeslice is exhausted) preemption, which is what makes the fairness
//! properties in the test suite reproducible without real hardware.

use lazy_static::lazy_static;
use spin::Mutex;

use crate::config::{MAX_CPU_NUM, MILLITICKS_PER_TICK, SCHED_PERIOD_TICKS};
use crate::task::accounting::account;
use crate::task::process::ProcessState;
use crate::task::table::{ProcessTable, PTABLE};
use crate::task::weight::weight;

/// Per-CPU scheduling state: just which slot (if any) is presently
/// dispatched there. Mirrors the teacher's `Processor`, stripped of the
/// hardware context-switch machinery this crate has no use for.
#[derive(Debug, Default, Clone, Copy)]
struct Processor {
    current: Option<usize>,
}

lazy_static! {
    static ref PROCESSORS: Mutex<[Processor; MAX_CPU_NUM]> = Mutex::new([Processor::default(); MAX_CPU_NUM]);
}

/// Find the runnable slot with the smallest `vruntime`. Ties go to the
/// lower table index — an explicit tie-break policy, not an artifact of
/// iteration order, since the picker must be deterministic for the
/// fairness properties to be reproducible.
///
/// Returns `None` if no slot is `Runnable`.
fn find_min_vruntime(table: &ProcessTable) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, p) in table.iter().enumerate() {
        if !p.state.is_runnable() {
            continue;
        }
        match best {
            None => best = Some(i),
            Some(b) if p.vruntime < table.slot(b).vruntime => best = Some(i),
            _ => {}
        }
    }
    best
}

/// Sum of weights over every `Runnable` slot (the chosen one included),
/// used to proportion the timeslice. Zero only if nothing is runnable,
/// which the caller never reaches (it already found a minimum).
fn total_runnable_weight(table: &ProcessTable) -> u64 {
    table
        .iter()
        .filter(|p| p.state.is_runnable())
        .map(|p| weight(p.nice) as u64)
        .sum()
}

/// `timeslice = SCHED_PERIOD * weight(nice) / total_weight`, in milliticks.
fn calc_timeslice(nice: u8, total_weight: u64) -> u32 {
    let period = (SCHED_PERIOD_TICKS as u64) * (MILLITICKS_PER_TICK as u64);
    ((period * weight(nice) as u64) / total_weight) as u32
}

/// Pick the next process to run and dispatch it: `Runnable -> Running`,
/// with a freshly computed `timeslice`. Returns the dispatched slot.
fn pick_and_dispatch(table: &mut ProcessTable) -> Option<usize> {
    let index = find_min_vruntime(table)?;
    let total_weight = total_runnable_weight(table);
    let nice = table.slot(index).nice;
    let timeslice = calc_timeslice(nice, total_weight);
    let p = table.slot_mut(index);
    debug_assert!(crate::task::process::is_valid_transition(p.state, ProcessState::Running));
    p.state = ProcessState::Running;
    p.timeslice = timeslice;
    log::trace!("pick: slot {} (pid {}) dispatched, timeslice {}", index, p.pid, timeslice);
    Some(index)
}

/// The scheduler's externally-visible, per-CPU entry points.
pub struct Scheduler;

impl Scheduler {
    /// Index of the slot currently dispatched on `cpu`, if any.
    pub fn current(cpu: usize) -> Option<usize> {
        PROCESSORS.lock()[cpu].current
    }

    /// Simulate one timer tick on `cpu`:
    ///
    /// - If `cpu` is idle, run the picker. If nothing is runnable, stay
    ///   idle and return `None`.
    /// - Apply one tick's worth of accounting to whichever process is
    ///   now current.
    /// - If that exhausts its timeslice, preempt it back to `Runnable`
    ///   and let the next tick re-pick.
    ///
    /// Returns the pid that ran during this tick, if any.
    pub fn tick_cpu(cpu: usize) -> Option<u32> {
        let mut table = PTABLE.lock();
        let mut procs = PROCESSORS.lock();

        if procs[cpu].current.is_none() {
            procs[cpu].current = pick_and_dispatch(&mut table);
        }
        let index = procs[cpu].current?;

        let pid = table.slot(index).pid;
        let (p, total_ticks) = table.slot_and_ticks_mut(index);
        account(p, total_ticks, MILLITICKS_PER_TICK);

        let p = table.slot_mut(index);
        if p.timeslice <= MILLITICKS_PER_TICK {
            p.timeslice = 0;
            debug_assert!(crate::task::process::is_valid_transition(p.state, ProcessState::Runnable));
            p.state = ProcessState::Runnable;
            log::trace!("tick_cpu({}): pid {} exhausted its timeslice", cpu, pid);
            procs[cpu].current = None;
        } else {
            p.timeslice -= MILLITICKS_PER_TICK;
        }
        Some(pid)
    }

    /// Simulate `n` ticks on `cpu` back to back. Returns the number of
    /// ticks that actually dispatched a process (as opposed to finding
    /// the CPU idle).
    pub fn run_for(cpu: usize, n: u32) -> u32 {
        (0..n).filter(|_| Self::tick_cpu(cpu).is_some()).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::table::ProcessTable;

    fn table_with_n_runnable(n: usize) -> ProcessTable {
        let mut t = ProcessTable::new();
        for _ in 0..n {
            t.userinit();
        }
        t
    }

    #[test]
    fn picks_lowest_vruntime_first() {
        let mut t = table_with_n_runnable(3);
        t.slot_mut(0).vruntime = 50;
        t.slot_mut(1).vruntime = 10;
        t.slot_mut(2).vruntime = 30;
        let idx = find_min_vruntime(&t).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn ties_broken_by_table_order() {
        let mut t = table_with_n_runnable(3);
        t.slot_mut(0).vruntime = 10;
        t.slot_mut(1).vruntime = 10;
        t.slot_mut(2).vruntime = 10;
        assert_eq!(find_min_vruntime(&t), Some(0));
    }

    #[test]
    fn no_runnable_returns_none() {
        let t = ProcessTable::new();
        assert_eq!(find_min_vruntime(&t), None);
    }

    #[test]
    fn timeslice_is_proportional_to_weight() {
        // Two equal-weight (nice 20) processes split the period evenly.
        let total = (crate::task::weight::weight(20) as u64) * 2;
        let ts = calc_timeslice(20, total);
        assert_eq!(ts, SCHED_PERIOD_TICKS * MILLITICKS_PER_TICK / 2);
    }

    #[test]
    fn dispatch_transitions_runnable_to_running() {
        let mut t = table_with_n_runnable(1);
        let idx = pick_and_dispatch(&mut t).unwrap();
        assert_eq!(t.slot(idx).state, ProcessState::Running);
        assert!(t.slot(idx).timeslice > 0);
    }
}
