use std::fmt::Write;
use std::sync::{Mutex, MutexGuard};
use crate::sat::Stats;
use crate::util;


#[derive(Default)]
struct Counters {
    retired: Stats, // Engines already discarded (batch mode).
    current: Stats,
}


/// Statistics shared between the session that produces them and the
/// interrupt handler that may print them at any moment.
pub struct Monitor {
    started: f64,
    counters: Mutex<Counters>,
}

impl Monitor {
    pub fn new() -> Monitor {
        Monitor {
            started: time::precise_time_s(),
            counters: Mutex::new(Counters::default()),
        }
    }

    // A panicking writer must not keep the interrupt path from reporting.
    fn lock(&self) -> MutexGuard<Counters> {
        self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn publish(&self, stats: Stats) {
        self.lock().current = stats;
    }

    /// Folds the live engine's counters into the total before the engine is dropped.
    pub fn retire(&self) {
        let mut counters = self.lock();
        counters.retired = counters.retired + counters.current;
        counters.current = Stats::default();
    }

    pub fn snapshot(&self) -> Stats {
        let counters = self.lock();
        counters.retired + counters.current
    }

    pub fn elapsed(&self) -> f64 {
        time::precise_time_s() - self.started
    }

    pub fn report(&self) -> String {
        format_stats(&self.snapshot(), self.elapsed(), util::mem_used_peak())
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Monitor::new()
    }
}


fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

pub fn format_stats(stats: &Stats, elapsed: f64, mem_kb: Option<usize>) -> String {
    let mut out = String::new();
    let max_literals = stats.tot_literals + stats.del_literals;

    let _ = writeln!(out, "restarts              : {}", stats.restarts);
    let _ = writeln!(out, "conflicts             : {:<12}   ({:.0} /sec)",
        stats.conflicts,
        ratio(stats.conflicts as f64, elapsed));

    let _ = writeln!(out, "decisions             : {:<12}   ({:4.2} % random) ({:.0} /sec)",
        stats.decisions,
        ratio(stats.rnd_decisions as f64 * 100.0, stats.decisions as f64),
        ratio(stats.decisions as f64, elapsed));

    let _ = writeln!(out, "propagations          : {:<12}   ({:.0} /sec)",
        stats.propagations,
        ratio(stats.propagations as f64, elapsed));

    let _ = writeln!(out, "conflict literals     : {:<12}   ({:4.2} % deleted)",
        stats.tot_literals,
        ratio(stats.del_literals as f64 * 100.0, max_literals as f64));

    if let Some(kb) = mem_kb.filter(|&kb| kb > 0) {
        let _ = writeln!(out, "Memory used           : {:.2} MB", kb as f64 / 1024.0);
    }
    let _ = writeln!(out, "Elapsed time          : {} s", elapsed);
    out
}
