//! Runtime/vruntime accounting.
//!
//! One hook, called from two places: the (simulated) timer tick handler
//! for the currently `Running` process on each CPU, and voluntary
//! yield/sleep/exit paths accounting for whatever fraction of a tick ran
//! since the last call. The original kernel inlines this logic directly
//! into `trap()` and `yield()`/`sleep()`/`exit()`; pulling it out here
//! keeps the table-manipulation and weight-math concerns apart the way
//! the teacher kernel's `cfs_scheduler.rs` separates `calc_time_slice`
//! from its call sites.

use crate::task::process::Pcb;
use crate::task::weight::vscale;

/// Apply `delta` actual milliticks of execution to `p`, and advance
/// `*total_ticks` by one whole tick — this is called exactly once per
/// simulated timer tick, so `total_ticks` counts ticks, not milliticks,
/// the same way the original kernel's `total_ticks` does. `ps` is what
/// converts it back to milliticks for display (`total_ticks * 1000`).
///
/// `delta` is accepted as zero (a no-op on `runtime`/`vruntime`) rather
/// than rejected — a caller driving a simulation one event at a time may
/// legitimately call this with `delta == 0` between two back-to-back
/// state transitions — but `total_ticks` still advances, since a call
/// still represents one tick having occurred.
pub fn account(p: &mut Pcb, total_ticks: &mut u32, delta: u32) {
    p.runtime += delta;
    p.vruntime += vscale(delta, p.nice);
    *total_ticks += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::process::Pcb;

    #[test]
    fn account_advances_runtime_vruntime_and_total() {
        let mut p = Pcb::empty();
        p.nice = 20;
        let mut total = 0u32;
        account(&mut p, &mut total, 1000);
        assert_eq!(p.runtime, 1000);
        assert_eq!(p.vruntime, 1000); // neutral nice: vscale is identity
        assert_eq!(total, 1, "total_ticks counts ticks, not milliticks");
    }

    #[test]
    fn account_zero_delta_still_advances_tick_count() {
        let mut p = Pcb::empty();
        let mut total = 0u32;
        account(&mut p, &mut total, 0);
        assert_eq!(p.runtime, 0);
        assert_eq!(p.vruntime, 0);
        assert_eq!(total, 1);
    }

    #[test]
    fn account_low_nice_accrues_vruntime_slower() {
        let mut fast = Pcb::empty();
        fast.nice = 0;
        let mut slow = Pcb::empty();
        slow.nice = 39;
        let mut total = 0u32;
        account(&mut fast, &mut total, 1000);
        account(&mut slow, &mut total, 1000);
        assert!(fast.vruntime < slow.vruntime);
        assert_eq!(total, 2);
    }
}
