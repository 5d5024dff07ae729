//! The syscall-facing introspection surface: `getnice`, `setnice`,
//! `getpname`, and `ps`.
//!
//! Everything here operates on the global [`PTABLE`] and flattens
//! [`SchedError`] down to the `-1` sentinel the original syscalls return,
//! the same boundary convention the teacher kernel uses at its own
//! syscall dispatch table (internal code keeps a typed `KernelResult`
//! all the way to the edge, and only the edge converts it).

use crate::error::SchedError;
use crate::task::table::PTABLE;

/// `getnice(pid)`: the target's nice value, or `-1` if no such process.
pub fn getnice(pid: i32) -> i32 {
    let table = PTABLE.lock();
    match table.find_by_pid(pid as u32) {
        Some(index) => table.slot(index).nice as i32,
        None => -1,
    }
}

/// `setnice(pid, value)`: `0` on success, `-1` if the process doesn't
/// exist or `value` is outside `[0, 39]`.
pub fn setnice(pid: i32, value: i32) -> i32 {
    if !crate::task::weight::is_valid_nice(value) {
        return SchedError::InvalidNice { value }.as_errno();
    }
    let mut table = PTABLE.lock();
    match table.find_by_pid(pid as u32) {
        Some(index) => {
            table.slot_mut(index).nice = value as u8;
            0
        }
        None => SchedError::ProcessNotFound { pid: pid as u32 }.as_errno(),
    }
}

/// `getpname(pid)`: prints the target's name to stdout and returns `0`,
/// or returns `-1` if no such process exists.
pub fn getpname(pid: i32) -> i32 {
    let table = PTABLE.lock();
    match table.find_by_pid(pid as u32) {
        Some(index) => {
            println!("{}", table.slot(index).name());
            0
        }
        None => -1,
    }
}

/// `ps(pid)`: dump process table rows to stdout in a fixed-width table.
///
/// `pid == 0` dumps every non-`Unused` slot, in table order; `pid > 0`
/// dumps only the matching process (nothing, beyond the header, if no
/// such process exists) — the same two modes the original `ps(int pid)`
/// supports. Column widths (name 16, pid 11, state 14, priority 13,
/// runtime/weight 17, runtime 13, vruntime 13) match the original
/// layout; the header line ends with the `tick <milliticks>` field
/// instead of a standalone line.
pub fn ps(pid: i32) {
    let table = PTABLE.lock();
    println!(
        "{:<16}{:<11}{:<14}{:<13}{:<17}{:<13}{:<13}tick {}",
        "name",
        "pid",
        "state",
        "priority",
        "runtime/weight",
        "runtime",
        "vruntime",
        table.total_ticks() as u64 * 1000
    );
    let print_row = |p: &crate::task::process::Pcb| {
        let w = crate::task::weight::weight(p.nice);
        let runtime_over_weight = (p.runtime as u64 * 1000) / w as u64;
        println!(
            "{:<16}{:<11}{:<14}{:<13}{:<17}{:<13}{}",
            p.name(),
            p.pid,
            p.state.as_str(),
            p.nice,
            runtime_over_weight,
            p.runtime,
            p.vruntime
        );
    };
    if pid == 0 {
        for p in table.iter() {
            if p.state != crate::task::process::ProcessState::Unused {
                print_row(p);
            }
        }
    } else if let Some(index) = table.find_by_pid(pid as u32) {
        print_row(table.slot(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::table::PTABLE;
    use std::sync::Mutex as StdMutex;

    // These tests exercise the global PTABLE singleton directly, so they
    // need to be serialized against each other (std test threads run
    // tests in this module concurrently by default).
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    fn reset_table() {
        let mut t = PTABLE.lock();
        *t = crate::task::table::ProcessTable::new();
    }

    #[test]
    fn getnice_and_setnice_round_trip() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_table();
        let pid = {
            let mut t = PTABLE.lock();
            let idx = t.userinit();
            t.slot(idx).pid
        };
        assert_eq!(getnice(pid as i32), 20);
        assert_eq!(setnice(pid as i32, 5), 0);
        assert_eq!(getnice(pid as i32), 5);
    }

    #[test]
    fn setnice_rejects_out_of_range() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_table();
        let pid = {
            let mut t = PTABLE.lock();
            let idx = t.userinit();
            t.slot(idx).pid
        };
        assert_eq!(setnice(pid as i32, 40), -1);
        assert_eq!(setnice(pid as i32, -1), -1);
        assert_eq!(getnice(pid as i32), 20, "rejected setnice must not change state");
    }

    #[test]
    fn getnice_unknown_pid_is_negative_one() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_table();
        assert_eq!(getnice(99999), -1);
    }

    #[test]
    fn setnice_unknown_pid_is_negative_one() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset_table();
        assert_eq!(setnice(99999, 10), -1);
    }
}
