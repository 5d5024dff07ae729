//! A tiny interactive shell over the scheduler, for exercising the
//! process table by hand instead of through a syscall layer that doesn't
//! exist in this simulation. Reads one command per line from stdin.
//!
//! Commands:
//!   init                    spawn the first process, print its pid
//!   fork <pid>              fork a child of <pid>, print the child's pid
//!   nice <pid>               print <pid>'s nice value
//!   setnice <pid> <value>    set <pid>'s nice value
//!   sleep <pid> <chan>       block <pid> on wait channel <chan>
//!   wake <chan>              wake everything sleeping on <chan>
//!   kill <pid>               flag <pid> for exit
//!   quit <pid>               transition <pid> straight to Zombie
//!   wait <pid>               reap one zombie child of <pid>, if any
//!   tick <cpu> <n>           simulate <n> ticks on <cpu>
//!   ps                       dump the whole process table
//!   ps <pid>                 dump just <pid>'s row
//!   exit                     leave the shell

use std::io::{self, BufRead, Write};

use cfs_kernel::task::table::PTABLE;
use cfs_kernel::task::wake;
use cfs_kernel::{getnice, ps, setnice, Scheduler};

fn main() {
    env_logger::init();
    let stdin = io::stdin();
    print!("> ");
    let _ = io::stdout().flush();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["init"] => {
                let mut t = PTABLE.lock();
                let idx = t.userinit();
                println!("pid {}", t.slot(idx).pid);
            }
            ["fork", pid] => match pid.parse::<u32>() {
                Ok(pid) => {
                    let mut t = PTABLE.lock();
                    match t.find_by_pid(pid) {
                        Some(index) => match t.fork(index) {
                            Ok(child_pid) => println!("pid {}", child_pid),
                            Err(e) => println!("error: {}", e),
                        },
                        None => println!("error: no such process"),
                    }
                }
                Err(_) => println!("error: bad pid"),
            },
            ["nice", pid] => match pid.parse::<i32>() {
                Ok(pid) => println!("{}", getnice(pid)),
                Err(_) => println!("error: bad pid"),
            },
            ["setnice", pid, value] => match (pid.parse::<i32>(), value.parse::<i32>()) {
                (Ok(pid), Ok(value)) => println!("{}", setnice(pid, value)),
                _ => println!("error: bad arguments"),
            },
            ["sleep", pid, chan] => match (pid.parse::<u32>(), chan.parse::<usize>()) {
                (Ok(pid), Ok(chan)) => {
                    let mut t = PTABLE.lock();
                    match t.find_by_pid(pid) {
                        Some(index) => t.sleep(index, chan),
                        None => println!("error: no such process"),
                    }
                }
                _ => println!("error: bad arguments"),
            },
            ["wake", chan] => match chan.parse::<usize>() {
                Ok(chan) => {
                    let mut t = PTABLE.lock();
                    wake::wakeup(&mut t, chan);
                }
                Err(_) => println!("error: bad channel"),
            },
            ["kill", pid] => match pid.parse::<u32>() {
                Ok(pid) => {
                    let mut t = PTABLE.lock();
                    if let Err(e) = t.kill(pid) {
                        println!("error: {}", e);
                    }
                }
                Err(_) => println!("error: bad pid"),
            },
            ["quit", pid] => match pid.parse::<u32>() {
                Ok(pid) => {
                    let mut t = PTABLE.lock();
                    match t.find_by_pid(pid) {
                        Some(index) => t.exit(index),
                        None => println!("error: no such process"),
                    }
                }
                Err(_) => println!("error: bad pid"),
            },
            ["wait", pid] => match pid.parse::<u32>() {
                Ok(pid) => {
                    let mut t = PTABLE.lock();
                    match t.find_by_pid(pid) {
                        Some(index) => match t.wait(index) {
                            Some(child) => println!("reaped {}", child),
                            None => println!("no zombie children"),
                        },
                        None => println!("error: no such process"),
                    }
                }
                Err(_) => println!("error: bad pid"),
            },
            ["tick", cpu, n] => match (cpu.parse::<usize>(), n.parse::<u32>()) {
                (Ok(cpu), Ok(n)) => {
                    let ran = Scheduler::run_for(cpu, n);
                    println!("ran {} of {} ticks", ran, n);
                }
                _ => println!("error: bad arguments"),
            },
            ["ps"] => ps(0),
            ["ps", pid] => match pid.parse::<i32>() {
                Ok(pid) => ps(pid),
                Err(_) => println!("error: bad pid"),
            },
            ["exit"] => break,
            [] => {}
            _ => println!("error: unrecognized command"),
        }
        print!("> ");
        let _ = io::stdout().flush();
    }
}
