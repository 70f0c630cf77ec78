//! Cooperative control cycle: drain commands → run one update.
//!
//! Implements the paced main loop with cycle time measurement and
//! overrun accounting. Commands and motor updates run on the same
//! thread, so no lock is ever taken between them.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` — lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` — pin to a CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO)` — RT priority.
//!
//! All RT calls are no-ops without the `rt` feature; the controller
//! then paces itself with `std::thread::sleep`, which is accurate
//! enough for simulation work.
//!
//! ## Cycle Loop
//! With `rt`, absolute-time sleep on `CLOCK_MONOTONIC` gives drift-free
//! pacing. An overrun is counted and logged but never stops the loop; a
//! late drive step is preferable to no drive step.

use crate::command::Transport;
use crate::controller::ActuatorController;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics. Updated every cycle with no
/// allocation.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of overruns detected.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (expected vs actual wake).
    pub max_latency_ns: i64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }
    }

    /// Average cycle time [ns] (0 before the first cycle).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Errors during RT setup or cycle pacing.
#[derive(Debug)]
pub enum CycleError {
    /// RT system call failed.
    RtSetup(String),
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RtSetup(msg) => write!(f, "RT setup error: {msg}"),
        }
    }
}

impl std::error::Error for CycleError {}

/// Lock all current and future memory pages.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(()) // No-op in simulation mode
}

/// Prefault stack pages so the cycle loop never page-faults.
fn prefault_stack() {
    // Touch 1 MB of stack to prefault pages.
    let mut buf = [0u8; 1024 * 1024];
    // Prevent compiler from optimizing away the write.
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to a specific CPU core.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(()) // No-op in simulation mode
}

/// Set SCHED_FIFO with the given RT priority.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(()) // No-op in simulation mode
}

/// Perform the full RT setup sequence. Must be called before entering
/// the cycle loop. In simulation mode all RT calls are no-ops.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// The paced cycle runner. Owns the actuator, its transport and the
/// timing statistics; `run()` loops until the running flag clears.
pub struct CycleRunner<T: Transport> {
    /// The single actuator record.
    pub controller: ActuatorController,
    /// Timing statistics, updated every cycle.
    pub stats: CycleStats,
    transport: T,
    cycle_time: Duration,
    running: Arc<AtomicBool>,
}

impl<T: Transport> CycleRunner<T> {
    /// Create a runner. The running flag is shared with the signal
    /// handler; clearing it ends `run()` after the current cycle.
    pub fn new(
        controller: ActuatorController,
        transport: T,
        cycle_time: Duration,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            controller,
            stats: CycleStats::new(),
            transport,
            cycle_time,
            running,
        }
    }

    /// Enter the cycle loop. Returns once the running flag clears; the
    /// power stage is disabled before handing the process back.
    pub fn run(&mut self) -> Result<(), CycleError> {
        info!(cycle_time_us = self.cycle_time.as_micros() as u64, "cycle loop started");

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop();

        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop();

        let _ = self.controller.disable();
        info!(
            cycles = self.stats.cycle_count,
            overruns = self.stats.overruns,
            avg_ns = self.stats.avg_cycle_ns(),
            max_ns = self.stats.max_cycle_ns,
            "cycle loop stopped"
        );
        result
    }

    /// One cycle: drain pending command frames, then run one controller
    /// update. Same thread for both, so commands never race the drive.
    fn cycle_body(&mut self) {
        self.transport.dispatch_pending(&mut self.controller);
        self.controller.update();
    }

    /// RT cycle loop using `clock_nanosleep(TIMER_ABSTIME)` for
    /// drift-free pacing.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let cycle_time_ns = self.cycle_time.as_nanos() as i64;
        let mut next_wake = clock_gettime(clock)
            .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

        while self.running.load(Ordering::Relaxed) {
            let cycle_start = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let wake_latency_ns = timespec_diff_ns(&cycle_start, &next_wake).max(0);

            self.cycle_body();

            let cycle_end = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let duration_ns = timespec_diff_ns(&cycle_end, &cycle_start);
            self.stats.record(duration_ns, wake_latency_ns);
            if duration_ns > cycle_time_ns {
                self.stats.overruns += 1;
                warn!(duration_ns, budget_ns = cycle_time_ns, "cycle overrun");
            }

            next_wake = timespec_add_ns(next_wake, cycle_time_ns);
            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    /// Simulation cycle loop using `std::thread::sleep`.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self) -> Result<(), CycleError> {
        use std::time::Instant;

        let cycle_time_ns = self.cycle_time.as_nanos() as i64;

        while self.running.load(Ordering::Relaxed) {
            let cycle_start = Instant::now();

            self.cycle_body();

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, 0);
            if duration_ns > cycle_time_ns {
                self.stats.overruns += 1;
                warn!(duration_ns, budget_ns = cycle_time_ns, "cycle overrun");
            }

            if let Some(remaining) = self.cycle_time.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// Compute the difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
